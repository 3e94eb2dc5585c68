pub mod error;
pub mod identity;
pub mod repository;
pub mod availability;
pub mod creator;
pub mod status;
pub mod dashboard;
pub mod memory;

pub use error::{BookingError, ErrorKind};
pub use identity::{CallerIdentity, Role, UnknownRole, User};
pub use repository::{BookingRepository, CarRepository, InsertOutcome, StoreError, StoreResult, UserRepository};
pub use availability::{AvailabilityChecker, AvailabilityReport};
pub use creator::{BookingCreator, BookingRequest};
pub use status::BookingStatusService;
pub use dashboard::OwnerDashboard;
pub use memory::MemoryStore;

pub type CoreResult<T> = Result<T, BookingError>;
