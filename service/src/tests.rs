//! Scenario fixtures driving the [`Service`] on the in-memory [`Database`].
//!
//! [`Database`]: crate::infra::Database

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, LazyLock, Mutex,
};

use common::{
    money::Currency,
    operations::{By, Insert, Perform, Select},
    Date, DateRange, DateTime,
};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    command::{
        create_booking, CreateBooking, CreateProperty, UpdateAvailability,
    },
    domain::{
        amenity::{self, Amenity},
        availability::{Day, Fields, Patch},
        booking::{self, PaymentMethod},
        property, user, Booking, Property, User,
    },
    infra::{
        mailer::{self, Letter},
        memory::{Interfering, NonTx, State},
        Database as _, Mailer, Memory,
    },
    read::availability::Range,
    task, Command as _, Config, Service,
};

/// Secret the [`Scenario`] sessions are signed with.
pub(crate) const JWT_SECRET: &[u8] = b"scenario secret";

/// [`user::Password`] of every [`User`] seeded by a [`Scenario`].
pub(crate) const PASSWORD: &str = "Strandkorb-42";

/// [`user::PasswordHash`] of the [`PASSWORD`], computed once.
static PASSWORD_HASH: LazyLock<user::PasswordHash> = LazyLock::new(|| {
    user::PasswordHash::new(&user::Password::new(PASSWORD).unwrap()).unwrap()
});

/// [`Service`] over an in-memory database seeded with a host, a second host,
/// a guest and the [`Amenity`] catalog.
pub(crate) struct Scenario {
    /// [`Service`] under test.
    pub(crate) service: Service<Memory, Outbox>,

    /// Host of the [`Property`]s created by this [`Scenario`].
    pub(crate) host: User,

    /// Host not owning anything.
    pub(crate) other_host: User,

    /// Guest booking the [`Property`]s.
    pub(crate) guest: User,
}

impl Scenario {
    /// Seeds a new [`Scenario`].
    pub(crate) async fn new() -> Self {
        let database = Memory::new();

        let host = user("Hanna", "hanna@example.de", user::Role::Host);
        let other_host = user("Otto", "otto@example.de", user::Role::Both);
        let guest = user("Gustav", "gustav@example.de", user::Role::Guest);
        for u in [&host, &other_host, &guest] {
            database.execute(Insert(u.clone())).await.unwrap();
        }

        for (id, name, category) in [
            (1, "amenity.wifi", amenity::Category::Essentials),
            (2, "amenity.kitchen", amenity::Category::Essentials),
            (3, "amenity.pool", amenity::Category::Features),
            (4, "amenity.beach_access", amenity::Category::Location),
            (5, "amenity.smoke_alarm", amenity::Category::Safety),
        ] {
            database
                .execute(Insert(Amenity {
                    id: amenity::Id::from(id),
                    name: name.into(),
                    icon: None,
                    category,
                }))
                .await
                .unwrap();
        }

        let config = Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                JWT_SECRET,
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                JWT_SECRET,
            ),
            calendar_horizon_months: Config::DEFAULT_CALENDAR_HORIZON_MONTHS,
            service_fee: Config::default_service_fee(),
            currency: Currency::Eur,
            complete_finished_bookings:
                task::complete_finished_bookings::Config::default(),
        };

        Self {
            service: Service {
                config,
                database,
                mailer: Outbox::default(),
            },
            host,
            other_host,
            guest,
        }
    }

    /// Returns a [`Service`] over the data of this [`Scenario`], whose
    /// transactions see the provided `write` committed by somebody else right
    /// before their `at`-th access to the data.
    pub(crate) fn interfered(
        &self,
        at: usize,
        write: impl Fn(&mut State) + Send + Sync + 'static,
    ) -> Service<Memory<Interfering<NonTx>>, Outbox> {
        Service {
            config: self.service.config().clone(),
            database: Memory::interfering(self.service.database(), at, write),
            mailer: self.service.mailer().clone(),
        }
    }

    /// Returns the [`Date`] `n` days after today.
    pub(crate) fn day(&self, n: i64) -> Date {
        Date::today().checked_add_days(n).unwrap()
    }

    /// Returns a [`CreateProperty`] of a published flat for 4 guests at
    /// `180.00` a night and `60.00` of cleaning fee.
    pub(crate) fn new_property(&self) -> CreateProperty {
        CreateProperty {
            host_id: self.host.id,
            title: property::Title::new("Loft by the river").unwrap(),
            description: property::Description::new(
                "Bright loft with a view over the river and the old town.",
            )
            .unwrap(),
            kind: property::Kind::Apartment,
            address: property::Address::new("Uferweg 7").unwrap(),
            city: property::City::new("Dresden").unwrap(),
            postal_code: property::PostalCode::new("01067").unwrap(),
            country: property::Country::new("Germany").unwrap(),
            location: property::Location::new(
                "51.0504".parse().unwrap(),
                "13.7373".parse().unwrap(),
            ),
            rooms: property::Rooms::new(4, 2, 3, Decimal::ONE).unwrap(),
            base_price: "180.00".parse().unwrap(),
            cleaning_fee: "60.00".parse().unwrap(),
            status: Some(property::Status::Published),
            amenities: vec![amenity::Id::from(1), amenity::Id::from(2)],
        }
    }

    /// Creates a new [`Property`] in the provided [`property::Status`].
    pub(crate) async fn property(&self, status: property::Status) -> Property {
        let mut cmd = self.new_property();
        cmd.status = Some(status);
        self.service.execute(cmd).await.unwrap()
    }

    /// Creates a new published [`Property`].
    pub(crate) async fn published_property(&self) -> Property {
        self.property(property::Status::Published).await
    }

    /// Creates a new published [`Property`] whose first 60 days require the
    /// host's approval.
    pub(crate) async fn approval_property(&self) -> Property {
        let property = self.published_property().await;
        self.patch(
            &property,
            Patch::Range {
                first: self.day(0),
                last: self.day(59),
                fields: Fields {
                    requires_approval: Some(true),
                    ..Fields::default()
                },
            },
        )
        .await;
        property
    }

    /// Applies the provided [`Patch`] to the calendar of the [`Property`].
    pub(crate) async fn patch(&self, property: &Property, patch: Patch) {
        let _ = self
            .service
            .execute(UpdateAvailability {
                property_id: property.id,
                initiator_id: property.host_id,
                patch,
            })
            .await
            .unwrap();
    }

    /// Books the nights between the `from` and `to` days as the guest.
    pub(crate) async fn try_book(
        &self,
        property: &Property,
        from: i64,
        to: i64,
    ) -> Result<Booking, Traced<create_booking::ExecutionError>> {
        self.service
            .execute(CreateBooking {
                guest_id: self.guest.id,
                property_id: property.id,
                stay: DateRange::new(self.day(from), self.day(to)).unwrap(),
                guests: 2,
                special_requests: None,
                payment_method: PaymentMethod::default(),
            })
            .await
    }

    /// Books the nights between the `from` and `to` days as the guest,
    /// panicking on failure.
    pub(crate) async fn book(
        &self,
        property: &Property,
        from: i64,
        to: i64,
    ) -> Booking {
        self.try_book(property, from, to).await.unwrap()
    }

    /// Returns the stored [`Booking`].
    pub(crate) async fn booking(&self, id: booking::Id) -> Booking {
        self.service
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(id)))
            .await
            .unwrap()
            .unwrap()
    }

    /// Returns the calendar [`Day`]s between the `from` (inclusive) and `to`
    /// (exclusive) days.
    pub(crate) async fn days(
        &self,
        property: &Property,
        from: i64,
        to: i64,
    ) -> Vec<Day> {
        self.service
            .database()
            .execute(Select(By::<Vec<Day>, _>::new(Range {
                property_id: property.id,
                dates: DateRange::new(self.day(from), self.day(to)).unwrap(),
            })))
            .await
            .unwrap()
    }
}

/// Creates a new [`User`] with the provided `role`.
fn user(name: &str, email: &str, role: user::Role) -> User {
    User {
        id: user::Id::new(),
        first_name: user::Name::new(name).unwrap(),
        last_name: user::Name::new("Muster").unwrap(),
        email: user::Email::new(email).unwrap(),
        password_hash: PASSWORD_HASH.clone(),
        phone: None,
        role,
        created_at: DateTime::now().coerce(),
    }
}

/// [`Mailer`] keeping the [`Letter`]s it's asked to deliver.
#[derive(Clone, Debug, Default)]
pub(crate) struct Outbox {
    /// Delivered [`Letter`]s.
    letters: Arc<Mutex<Vec<Letter>>>,

    /// Indicator whether every [`Letter`] is rejected.
    rejecting: Arc<AtomicBool>,
}

impl Outbox {
    /// Returns the delivered [`Letter`]s.
    pub(crate) fn letters(&self) -> Vec<Letter> {
        self.letters.lock().unwrap().clone()
    }

    /// Makes this [`Outbox`] reject every further [`Letter`].
    pub(crate) fn reject_all(&self) {
        self.rejecting.store(true, Ordering::SeqCst);
    }
}

impl Mailer<Perform<Letter>> for Outbox {
    type Ok = ();
    type Err = Traced<mailer::Error>;

    async fn execute(
        &self,
        Perform(letter): Perform<Letter>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(tracerr::new!(mailer::Error::Rejected(
                letter.recipient().clone(),
            )));
        }
        self.letters.lock().unwrap().push(letter);
        Ok(())
    }
}
