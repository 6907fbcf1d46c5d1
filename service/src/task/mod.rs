//! Background [`Task`]s definitions.

mod background;
pub mod complete_finished_bookings;

pub use common::Handler as Task;

pub use self::{
    background::Background,
    complete_finished_bookings::CompleteFinishedBookings,
};
