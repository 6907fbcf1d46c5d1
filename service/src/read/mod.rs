//! Read entities definitions.

pub mod availability;
pub mod booking;
pub mod property;
