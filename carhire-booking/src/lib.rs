pub mod models;
pub mod period;
pub mod lifecycle;

pub use models::{Booking, BookingStatus, UnknownStatus};
pub use period::{PeriodError, RentalPeriod};
pub use lifecycle::TransitionError;
