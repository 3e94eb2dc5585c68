use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingEventKind {
    Created,
    StatusChanged,
}

impl BookingEventKind {
    /// Name used for the SSE `event:` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingEventKind::Created => "booking_created",
            BookingEventKind::StatusChanged => "booking_status_changed",
        }
    }
}

/// Broadcast whenever a booking is created or changes status.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingEvent {
    pub kind: BookingEventKind,
    pub booking_id: Uuid,
    pub car_id: Uuid,
    pub status: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub occurred_at: i64,
}
