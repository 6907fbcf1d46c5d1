//! Availability calendar [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::availability::{Calendar, Changes, Day, Transition},
    infra::{
        database::{self, memory::Store, Memory},
        Database,
    },
    read::availability::{Coverage, Price, Range, Stay},
};

impl<S: Store> Database<Insert<Calendar>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(calendar): Insert<Calendar>,
    ) -> Result<Self::Ok, Self::Err> {
        let Calendar { property_id, days } = calendar;
        self.0
            .with(|s| {
                let cal = s.calendar.entry(property_id).or_default();
                for day in days {
                    _ = cal.entry(day.date).or_insert(day);
                }
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Select<By<Vec<Day>, Range>>> for Memory<S> {
    type Ok = Vec<Day>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Day>, Range>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Range { property_id, dates } = by.into_inner();
        self.0
            .with(|s| {
                s.calendar
                    .get(&property_id)
                    .into_iter()
                    .flat_map(|c| c.range(dates.start()..dates.end()))
                    .map(|(_, d)| d.clone())
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Select<By<Price, Stay>>> for Memory<S> {
    type Ok = Price;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Price, Stay>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Stay { property_id, stay } = by.into_inner();
        self.0
            .with(|s| {
                Price::of(
                    s.calendar
                        .get(&property_id)
                        .into_iter()
                        .flat_map(|c| c.range(stay.start()..stay.end()))
                        .map(|(_, d)| d),
                )
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Select<By<Coverage, Stay>>> for Memory<S> {
    type Ok = Coverage;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Coverage, Stay>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Stay { property_id, stay } = by.into_inner();
        self.0
            .with(|s| {
                Coverage::of(
                    s.calendar
                        .get(&property_id)
                        .into_iter()
                        .flat_map(|c| c.range(stay.start()..stay.end()))
                        .map(|(_, d)| d),
                )
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Update<Changes>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(changes): Update<Changes>,
    ) -> Result<Self::Ok, Self::Err> {
        let Changes {
            property_id,
            entries,
        } = changes;
        self.0
            .with(|s| {
                let Some(cal) = s.calendar.get_mut(&property_id) else {
                    return;
                };
                for (date, fields) in &entries {
                    if let Some(day) = cal.get_mut(date) {
                        day.apply(fields);
                    }
                }
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Store> Database<Update<Transition>> for Memory<S> {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transition): Update<Transition>,
    ) -> Result<Self::Ok, Self::Err> {
        let stay = transition.stay;
        self.0
            .with(|s| {
                let Some(cal) = s.calendar.get_mut(&transition.property_id)
                else {
                    return 0;
                };
                let mut changed = 0;
                for (_, day) in cal.range_mut(stay.start()..stay.end()) {
                    if transition.matches(day) {
                        day.status = transition.to;
                        changed += 1;
                    }
                }
                changed
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select, Transact, Update},
        DateRange,
    };
    use rust_decimal::Decimal;

    use crate::{
        domain::availability::{Fields, Patch, Status, Transition},
        infra::Database as _,
        read::availability::{Price, Stay},
        tests::Scenario,
    };

    #[tokio::test]
    async fn transitions_offered_available_nights_only() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        let _ = s.book(&property, 4, 5).await;
        s.patch(
            &property,
            Patch::Dates {
                dates: vec![s.day(2)],
                fields: Fields {
                    status: Some(Status::Blocked),
                    ..Fields::default()
                },
            },
        )
        .await;
        s.patch(
            &property,
            Patch::Dates {
                dates: vec![s.day(3)],
                fields: Fields {
                    is_available: Some(false),
                    ..Fields::default()
                },
            },
        )
        .await;
        let before = s.days(&property, 1, 6).await;
        let stay = DateRange::new(s.day(1), s.day(6)).unwrap();

        let tx = s.service.database().execute(Transact).await.unwrap();
        let held = tx
            .execute(Update(Transition {
                property_id: property.id,
                stay,
                from: vec![Status::Available],
                to: Status::Booked,
                offered_only: true,
            }))
            .await
            .unwrap();
        drop(tx);

        assert_eq!(held, 2, "only the 1st and the 5th nights are free");
        assert!(held < u64::from(stay.nights()));
        let after = s.days(&property, 1, 6).await;
        assert_eq!(
            after.iter().map(|d| d.status).collect::<Vec<_>>(),
            before.iter().map(|d| d.status).collect::<Vec<_>>(),
        );
    }

    #[tokio::test]
    async fn prices_stays_additively() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        for (n, price) in [(2, "200.50"), (4, "99.99")] {
            s.patch(
                &property,
                Patch::Dates {
                    dates: vec![s.day(n)],
                    fields: Fields {
                        price: Some(price.parse().unwrap()),
                        ..Fields::default()
                    },
                },
            )
            .await;
        }
        let (s, property_id) = (&s, property.id);
        let price = move |from, to| {
            let stay = DateRange::new(s.day(from), s.day(to)).unwrap();
            s.service
                .database()
                .execute(Select(By::<Price, _>::new(Stay { property_id, stay })))
        };

        let whole = price(1, 7).await.unwrap();
        assert_eq!(*whole, "1020.49".parse::<Decimal>().unwrap());
        for split in 2..7 {
            let head = price(1, split).await.unwrap();
            let tail = price(split, 7).await.unwrap();
            assert_eq!(*head + *tail, *whole, "split at {split}");
        }
    }
}
