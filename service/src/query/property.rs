//! [`Query`] collection related to [`Property`]s.

use common::operations::By;

use crate::{
    domain::{property, user, Property},
    read::property::search,
};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries a [`Property`] by its [`property::Id`].
pub type ById = DatabaseQuery<By<Option<Property>, property::Id>>;

/// Queries [`Property`]s hosted by the [`User`], most recent first.
pub type ByHost = DatabaseQuery<By<Vec<Property>, user::Id>>;

/// Searches published [`Property`]s, cheapest first.
pub type Search = DatabaseQuery<By<search::Page, search::Selector>>;

#[cfg(test)]
mod spec {
    use common::DateRange;
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            availability::{Fields, Patch},
            property, Property,
        },
        read::property::search::{Arguments, Filter, Page, Selector},
        tests::Scenario,
        Command as _, Query as _,
    };

    use super::Search;

    async fn priced(
        s: &Scenario,
        price: &str,
        status: property::Status,
    ) -> Property {
        let mut cmd = s.new_property();
        cmd.base_price = price.parse().unwrap();
        cmd.status = Some(status);
        s.service.execute(cmd).await.unwrap()
    }

    async fn search(
        s: &Scenario,
        arguments: Arguments,
        filter: Filter,
    ) -> Page {
        s.service
            .execute(Search::by(Selector { arguments, filter }))
            .await
            .unwrap()
    }

    fn ids(page: &Page) -> Vec<property::Id> {
        page.items.iter().map(|p| p.id).collect()
    }

    fn staying(s: &Scenario, from: i64, to: i64) -> Filter {
        Filter {
            stay: Some(DateRange::new(s.day(from), s.day(to)).unwrap()),
            ..Filter::default()
        }
    }

    #[tokio::test]
    async fn sorts_cheapest_first_and_paginates() {
        let s = Scenario::new().await;
        let dear = priced(&s, "250.00", property::Status::Published).await;
        let cheap = priced(&s, "120.00", property::Status::Published).await;
        let middle = priced(&s, "180.00", property::Status::Published).await;
        let _ = priced(&s, "50.00", property::Status::Draft).await;

        let first = search(
            &s,
            Arguments::new(Some(1), Some(2)).unwrap(),
            Filter::default(),
        )
        .await;
        assert_eq!(ids(&first), vec![cheap.id, middle.id]);
        assert_eq!(first.total, 3);
        assert_eq!(first.total_pages(), 2);
        assert_eq!(
            first
                .items
                .iter()
                .map(|p| p.base_price.amount)
                .collect::<Vec<_>>(),
            vec![Decimal::from(120), Decimal::from(180)],
        );

        let second = search(
            &s,
            Arguments::new(Some(2), Some(2)).unwrap(),
            Filter::default(),
        )
        .await;
        assert_eq!(ids(&second), vec![dear.id]);
        assert_eq!(second.total, 3);

        let beyond = search(
            &s,
            Arguments::new(Some(3), Some(2)).unwrap(),
            Filter::default(),
        )
        .await;
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 3);
    }

    #[tokio::test]
    async fn requires_every_night_but_checkout_bookable() {
        let s = Scenario::new().await;
        let busy = priced(&s, "120.00", property::Status::Published).await;
        let free = priced(&s, "180.00", property::Status::Published).await;
        let _ = s.book(&busy, 3, 5).await;

        let page = search(&s, Arguments::default(), staying(&s, 1, 3)).await;
        assert_eq!(ids(&page), vec![busy.id, free.id], "checkout excluded");

        let page = search(&s, Arguments::default(), staying(&s, 1, 4)).await;
        assert_eq!(ids(&page), vec![free.id]);
        assert_eq!(page.total, 1);

        let page = search(&s, Arguments::default(), staying(&s, 5, 6)).await;
        assert_eq!(ids(&page), vec![busy.id, free.id]);
    }

    #[tokio::test]
    async fn counts_missing_days_as_unavailable() {
        let s = Scenario::new().await;
        let _ = s.published_property().await;

        let page =
            search(&s, Arguments::default(), staying(&s, 360, 380)).await;
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);

        let page =
            search(&s, Arguments::default(), staying(&s, 400, 402)).await;
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn excludes_approval_nights_from_instant_book() {
        let s = Scenario::new().await;
        let approval = priced(&s, "120.00", property::Status::Published).await;
        let instant = priced(&s, "180.00", property::Status::Published).await;
        s.patch(
            &approval,
            Patch::Dates {
                dates: vec![s.day(2)],
                fields: Fields {
                    requires_approval: Some(true),
                    ..Fields::default()
                },
            },
        )
        .await;

        let page = search(&s, Arguments::default(), staying(&s, 1, 4)).await;
        assert_eq!(ids(&page), vec![approval.id, instant.id]);

        let page = search(
            &s,
            Arguments::default(),
            Filter {
                instant_book: true,
                ..staying(&s, 1, 4)
            },
        )
        .await;
        assert_eq!(ids(&page), vec![instant.id]);

        let page = search(
            &s,
            Arguments::default(),
            Filter {
                instant_book: true,
                ..staying(&s, 3, 5)
            },
        )
        .await;
        assert_eq!(ids(&page), vec![approval.id, instant.id]);
    }
}
