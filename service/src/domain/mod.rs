//! Domain definitions.

pub mod amenity;
pub mod availability;
pub mod booking;
pub mod property;
pub mod user;

pub use self::{
    amenity::Amenity, booking::Booking, property::Property, user::User,
};
