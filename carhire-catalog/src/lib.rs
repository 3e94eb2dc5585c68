pub mod car;
pub mod pricing;

pub use car::{Car, CarCategory, CatalogError, FuelType, NewCar, Transmission};
pub use pricing::{rental_total, PricingError};
