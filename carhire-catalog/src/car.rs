use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Body styles an owner can list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CarCategory {
    Sedan,
    #[serde(rename = "SUV")]
    Suv,
    Van,
}

impl CarCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarCategory::Sedan => "Sedan",
            CarCategory::Suv => "SUV",
            CarCategory::Van => "Van",
        }
    }
}

impl FromStr for CarCategory {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sedan" => Ok(CarCategory::Sedan),
            "SUV" => Ok(CarCategory::Suv),
            "Van" => Ok(CarCategory::Van),
            other => Err(CatalogError::InvalidField {
                field: "category",
                reason: format!("unknown category '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Transmission {
    Automatic,
    Manual,
    #[serde(rename = "Semi-Automatic")]
    SemiAutomatic,
}

impl Transmission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Automatic => "Automatic",
            Transmission::Manual => "Manual",
            Transmission::SemiAutomatic => "Semi-Automatic",
        }
    }
}

impl FromStr for Transmission {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Automatic" => Ok(Transmission::Automatic),
            "Manual" => Ok(Transmission::Manual),
            "Semi-Automatic" => Ok(Transmission::SemiAutomatic),
            other => Err(CatalogError::InvalidField {
                field: "transmission",
                reason: format!("unknown transmission '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
    #[serde(rename = "CNG")]
    Cng,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
            FuelType::Cng => "CNG",
        }
    }
}

impl FromStr for FuelType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Petrol" => Ok(FuelType::Petrol),
            "Diesel" => Ok(FuelType::Diesel),
            "Electric" => Ok(FuelType::Electric),
            "Hybrid" => Ok(FuelType::Hybrid),
            "CNG" => Ok(FuelType::Cng),
            other => Err(CatalogError::InvalidField {
                field: "fuel_type",
                reason: format!("unknown fuel type '{}'", other),
            }),
        }
    }
}

impl fmt::Display for CarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A car listed in the catalog.
///
/// `is_available` is the owner's listing switch. It is informational for
/// booking purposes: whether a car is free on given dates is decided by the
/// bookings that reference it, never by this flag alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub category: CarCategory,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub seating_capacity: i32,
    /// Minor currency units (cents)
    pub price_per_day: i64,
    pub location: String,
    pub description: String,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

/// Owner-submitted listing, validated before it becomes a [`Car`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCar {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub category: CarCategory,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub seating_capacity: i32,
    pub price_per_day: i64,
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

pub const MIN_YEAR: i32 = 1950;
pub const MAX_SEATS: i32 = 15;

impl NewCar {
    /// `current_year` bounds the model year; next year's models are accepted.
    pub fn validate(&self, current_year: i32) -> Result<(), CatalogError> {
        if self.brand.trim().is_empty() {
            return Err(CatalogError::missing("brand"));
        }
        if self.model.trim().is_empty() {
            return Err(CatalogError::missing("model"));
        }
        if self.location.trim().is_empty() {
            return Err(CatalogError::missing("location"));
        }
        if self.year < MIN_YEAR || self.year > current_year + 1 {
            return Err(CatalogError::InvalidField {
                field: "year",
                reason: format!("must be between {} and {}", MIN_YEAR, current_year + 1),
            });
        }
        if !(1..=MAX_SEATS).contains(&self.seating_capacity) {
            return Err(CatalogError::InvalidField {
                field: "seating_capacity",
                reason: format!("must be between 1 and {}", MAX_SEATS),
            });
        }
        if self.price_per_day <= 0 {
            return Err(CatalogError::InvalidField {
                field: "price_per_day",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// New listings start out available.
    pub fn into_car(self, owner_id: Uuid) -> Car {
        Car {
            id: Uuid::new_v4(),
            owner_id,
            brand: self.brand.trim().to_string(),
            model: self.model.trim().to_string(),
            year: self.year,
            category: self.category,
            transmission: self.transmission,
            fuel_type: self.fuel_type,
            seating_capacity: self.seating_capacity,
            price_per_day: self.price_per_day,
            location: self.location.trim().to_string(),
            description: self.description,
            image_url: self.image_url,
            is_available: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

impl CatalogError {
    fn missing(field: &'static str) -> Self {
        CatalogError::InvalidField {
            field,
            reason: "is required".to_string(),
        }
    }
}
