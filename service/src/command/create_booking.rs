//! [`Command`] for creating a new [`Booking`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    Date, DateRange, DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        availability::{self, Transition},
        booking::{
            self, PaymentMethod, PaymentStatus, Pricing, SpecialRequests,
        },
        property, user, Booking, Property, User,
    },
    infra::{database, Database},
    read::{
        availability::{Coverage, Price, Stay},
        booking::{HasConflict, Overlap},
    },
    Service,
};

use super::Command;

/// [`Command`] for a guest booking a [`Property`].
///
/// The new [`Booking`] is [`booking::Status::Confirmed`] right away, unless
/// any of its nights requires the host's approval, making it
/// [`booking::Status::Pending`].
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// ID of the [`User`] booking the [`Property`].
    pub guest_id: user::Id,

    /// ID of the [`Property`] to book.
    pub property_id: property::Id,

    /// Nights to book.
    pub stay: DateRange,

    /// Number of guests.
    pub guests: u16,

    /// Guest's [`SpecialRequests`], if any.
    pub special_requests: Option<SpecialRequests>,

    /// [`PaymentMethod`] chosen by the guest.
    pub payment_method: PaymentMethod,
}

impl<Db, Ml> Command<CreateBooking> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HasConflict, Overlap>>,
            Ok = HasConflict,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Coverage, Stay>>,
            Ok = Coverage,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Price, Stay>>,
            Ok = Price,
            Err = Traced<database::Error>,
        > + Database<
            Update<Transition>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            guest_id,
            property_id,
            stay,
            guests,
            special_requests,
            payment_method,
        } = cmd;

        if guests == 0 {
            return Err(tracerr::new!(E::NoGuests));
        }
        if stay.start() < Date::today() {
            return Err(tracerr::new!(E::CheckInPassed(stay.start())));
        }

        drop(
            self.database()
                .execute(Select(By::<Option<User>, _>::new(guest_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(guest_id))
                .map_err(tracerr::wrap!())?,
        );

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        check_bookable(&property, guest_id, guests)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of the same `Property`.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        check_bookable(&property, guest_id, guests)?;

        let conflict = tx
            .execute(Select(By::<HasConflict, _>::new(Overlap {
                property_id,
                stay,
                exclude: None,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if *conflict {
            return Err(tracerr::new!(E::Conflict(stay)));
        }

        let nights = stay.nights();
        let coverage = tx
            .execute(Select(By::<Coverage, _>::new(Stay {
                property_id,
                stay,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !coverage.is_bookable(nights) {
            return Err(tracerr::new!(E::NotAvailable(stay)));
        }

        let price = tx
            .execute(Select(By::<Price, _>::new(Stay { property_id, stay })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !price.is_chargeable() {
            return Err(tracerr::new!(E::Unpriceable(stay)));
        }

        let status = if coverage.requires_approval {
            booking::Status::Pending
        } else {
            booking::Status::Confirmed
        };

        let held = tx
            .execute(Update(Transition {
                property_id,
                stay,
                from: vec![availability::Status::Available],
                to: status.calendar_status(),
                offered_only: true,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if held != u64::from(nights) {
            // Dropping the transaction discards the partial transition.
            return Err(tracerr::new!(E::NotAvailable(stay)));
        }

        let now = DateTime::now();
        let booking = Booking {
            id: booking::Id::new(),
            property_id,
            guest_id,
            host_id: property.host_id,
            stay,
            guests,
            pricing: Pricing::quote(
                Money::new(*price, property.base_price.currency),
                property.cleaning_fee,
                self.config().service_fee,
            ),
            status,
            payment_status: PaymentStatus::Unpaid,
            payment_method,
            special_requests,
            reason: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        tx.execute(Insert(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Booking(id: {})` of `Property(id: {property_id})` created as \
             `{status}` for {stay}",
            booking.id,
        );

        Ok(booking)
    }
}

/// Checks whether the provided [`Property`] can be booked by the provided
/// guest for the provided number of `guests`.
fn check_bookable(
    property: &Property,
    guest_id: user::Id,
    guests: u16,
) -> Result<(), Traced<ExecutionError>> {
    use ExecutionError as E;

    if !property.is_bookable() {
        return Err(tracerr::new!(E::PropertyNotBookable(property.id)));
    }
    if property.is_hosted_by(guest_id) {
        return Err(tracerr::new!(E::OwnProperty(property.id)));
    }
    let capacity = property.rooms.guest_capacity();
    if guests > capacity {
        return Err(tracerr::new!(E::CapacityExceeded { guests, capacity }));
    }
    Ok(())
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Number of guests exceeds the [`Property`]'s capacity.
    #[display("{guests} guests exceed the capacity of {capacity}")]
    CapacityExceeded {
        /// Requested number of guests.
        guests: u16,

        /// Guest capacity of the [`Property`].
        capacity: u16,
    },

    /// Check-in date is in the past.
    #[display("Check-in date `{_0}` has passed")]
    CheckInPassed(#[error(not(source))] Date),

    /// Another active [`Booking`] overlaps the stay.
    #[display("Stay `{_0}` overlaps another booking")]
    Conflict(#[error(not(source))] DateRange),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// No guests requested.
    #[display("At least one guest is required")]
    NoGuests,

    /// Some nights of the stay cannot be booked.
    #[display("Stay `{_0}` is not available")]
    NotAvailable(#[error(not(source))] DateRange),

    /// Guest is the host of the [`Property`].
    #[display("`Property(id: {_0})` cannot be booked by its host")]
    OwnProperty(#[error(not(source))] property::Id),

    /// [`Property`] is not published.
    #[display("`Property(id: {_0})` is not bookable")]
    PropertyNotBookable(#[error(not(source))] property::Id),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// Stay has no calendar prices.
    #[display("Stay `{_0}` cannot be priced")]
    Unpriceable(#[error(not(source))] DateRange),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select},
        DateRange,
    };
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            availability::{Fields, Patch, Status as DayStatus},
            booking::{PaymentMethod, PaymentStatus, Status},
            property,
        },
        infra::Database as _,
        read::booking::{HasConflict, Overlap},
        tests::Scenario,
        Command as _,
    };

    use super::{CreateBooking, ExecutionError};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn confirms_instantly_bookable_stay() {
        let s = Scenario::new().await;
        let property = s.published_property().await;

        let booking = s.book(&property, 1, 4).await;

        assert_eq!(booking.status, Status::Confirmed);
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert_eq!(booking.payment_method, PaymentMethod::CreditCard);
        assert_eq!(booking.nights(), 3);
        assert_eq!(booking.host_id, s.host.id);
        assert_eq!(booking.pricing.base.amount, decimal("540.00"));
        assert_eq!(booking.pricing.service_fee.amount, decimal("27.00"));
        assert_eq!(booking.pricing.cleaning_fee.amount, decimal("60.00"));
        assert_eq!(booking.pricing.total.amount, decimal("627.00"));

        let days = s.days(&property, 0, 5).await;
        let statuses = days.iter().map(|d| d.status).collect::<Vec<_>>();
        assert_eq!(
            statuses,
            vec![
                DayStatus::Available,
                DayStatus::Booked,
                DayStatus::Booked,
                DayStatus::Booked,
                DayStatus::Available,
            ],
        );
    }

    #[tokio::test]
    async fn holds_stay_requiring_approval() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        s.patch(
            &property,
            Patch::Dates {
                dates: vec![s.day(2)],
                fields: Fields {
                    requires_approval: Some(true),
                    ..Fields::default()
                },
            },
        )
        .await;

        let booking = s.book(&property, 1, 4).await;

        assert_eq!(booking.status, Status::Pending);
        assert!(s
            .days(&property, 1, 4)
            .await
            .iter()
            .all(|d| d.status == DayStatus::Pending));
    }

    #[tokio::test]
    async fn sums_nightly_prices() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        s.patch(
            &property,
            Patch::Dates {
                dates: vec![s.day(2)],
                fields: Fields {
                    price: Some(decimal("200.50")),
                    ..Fields::default()
                },
            },
        )
        .await;

        let booking = s.book(&property, 1, 4).await;

        assert_eq!(booking.pricing.base.amount, decimal("560.50"));
        assert_eq!(booking.pricing.service_fee.amount, decimal("28.03"));
        assert_eq!(booking.pricing.total.amount, decimal("648.53"));
    }

    #[tokio::test]
    async fn rejects_overlapping_stays() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        let _ = s.book(&property, 3, 6).await;

        for (from, to) in [(1, 4), (5, 8), (4, 5), (2, 7)] {
            let err = s.try_book(&property, from, to).await.unwrap_err();
            assert!(
                matches!(err.as_ref(), ExecutionError::Conflict(_)),
                "{from}..{to}: {err}",
            );
        }

        let before = s.book(&property, 1, 3).await;
        let after = s.book(&property, 6, 8).await;
        assert_eq!(before.status, Status::Confirmed);
        assert_eq!(after.status, Status::Confirmed);
    }

    #[tokio::test]
    async fn rejects_unavailable_and_unknown_days() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
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

        let err = s.try_book(&property, 1, 4).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NotAvailable(_)));

        let err = s.try_book(&property, 360, 380).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NotAvailable(_)));

        assert!(s
            .days(&property, 1, 3)
            .await
            .iter()
            .all(|d| d.status == DayStatus::Available));
    }

    #[tokio::test]
    async fn validates_request() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        let stay = DateRange::new(s.day(1), s.day(3)).unwrap();
        let request = CreateBooking {
            guest_id: s.guest.id,
            property_id: property.id,
            stay,
            guests: 2,
            special_requests: None,
            payment_method: PaymentMethod::Paypal,
        };

        let err = s
            .service
            .execute(CreateBooking {
                guests: 5,
                ..request.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::CapacityExceeded {
                guests: 5,
                capacity: 4,
            },
        ));

        let err = s
            .service
            .execute(CreateBooking {
                guests: 0,
                ..request.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NoGuests));

        let err = s
            .service
            .execute(CreateBooking {
                stay: DateRange::new(s.day(-2), s.day(1)).unwrap(),
                ..request.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::CheckInPassed(_)));

        let err = s
            .service
            .execute(CreateBooking {
                guest_id: s.host.id,
                ..request.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::OwnProperty(_)));

        let draft = s.property(property::Status::Draft).await;
        let err = s
            .service
            .execute(CreateBooking {
                property_id: draft.id,
                ..request.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotBookable(_),
        ));

        let booking = s.service.execute(request).await.unwrap();
        assert_eq!(booking.payment_method, PaymentMethod::Paypal);
    }

    #[tokio::test]
    async fn lets_only_one_of_racing_bookings_win() {
        let s = Scenario::new().await;
        let property = s.published_property().await;

        let (first, second) = tokio::join!(
            s.try_book(&property, 1, 5),
            s.try_book(&property, 3, 7),
        );

        assert!(
            first.is_ok() ^ second.is_ok(),
            "exactly one booking must succeed",
        );
        let winner = first.or(second).unwrap();
        let days = s.days(&property, 1, 7).await;
        for d in days {
            let expected = if winner.stay.contains(d.date) {
                DayStatus::Booked
            } else {
                DayStatus::Available
            };
            assert_eq!(d.status, expected, "{}", d.date);
        }
    }

    #[tokio::test]
    async fn discards_partially_held_stay() {
        let s = Scenario::new().await;
        let property = s.published_property().await;
        let (property_id, blocked) = (property.id, s.day(2));
        // Blocks a night right after the stay has been checked.
        let service = s.interfered(5, move |state| {
            if let Some(day) = state
                .calendar
                .get_mut(&property_id)
                .and_then(|c| c.get_mut(&blocked))
            {
                day.status = DayStatus::Blocked;
            }
        });
        let stay = DateRange::new(s.day(1), s.day(4)).unwrap();

        let err = service
            .execute(CreateBooking {
                guest_id: s.guest.id,
                property_id,
                stay,
                guests: 2,
                special_requests: None,
                payment_method: PaymentMethod::default(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotAvailable(r) if *r == stay,
        ));
        let statuses = s
            .days(&property, 1, 4)
            .await
            .into_iter()
            .map(|d| d.status)
            .collect::<Vec<_>>();
        assert_eq!(
            statuses,
            vec![DayStatus::Available, DayStatus::Blocked, DayStatus::Available],
        );
        let conflict = s
            .service
            .database()
            .execute(Select(By::<HasConflict, _>::new(Overlap {
                property_id,
                stay,
                exclude: None,
            })))
            .await
            .unwrap();
        assert!(!*conflict, "no `Booking` is stored");
    }
}
