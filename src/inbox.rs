// Booking inbox: every booking with a confirm/cancel control
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::api::{ApiClient, BookingRecord, BookingStatus};
use crate::notification::Notification;

pub const FETCH_FAILED: &str = "Failed to fetch bookings";

#[derive(Debug, Clone, PartialEq)]
pub enum InboxState {
    Loading,
    Ready,
    Failed(String),
}

pub struct BookingInbox {
    api: Arc<dyn ApiClient>,
    state: InboxState,
    bookings: Vec<BookingRecord>,
    updating: Option<i64>,
}

impl BookingInbox {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            state: InboxState::Loading,
            bookings: Vec::new(),
            updating: None,
        }
    }

    pub fn state(&self) -> &InboxState {
        &self.state
    }

    pub fn bookings(&self) -> &[BookingRecord] {
        &self.bookings
    }

    // The booking whose status control is disabled right now
    pub fn updating(&self) -> Option<i64> {
        self.updating
    }

    pub async fn load(&mut self) -> &InboxState {
        match self.api.list_bookings().await {
            Ok(bookings) => {
                debug!(count = bookings.len(), "Bookings loaded");
                self.bookings = bookings;
                self.state = InboxState::Ready;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch bookings");
                self.state = InboxState::Failed(FETCH_FAILED.to_string());
            }
        }
        &self.state
    }

    /// Changes a booking's status on the backend and mirrors it locally once
    /// the backend accepts.
    pub async fn update_status(&mut self, booking_id: i64, status: BookingStatus) -> Notification {
        self.updating = Some(booking_id);
        debug!(booking_id, %status, "Sending status update");
        let result = self.api.update_booking_status(booking_id, status).await;
        self.updating = None;

        match result {
            Ok(_) => {
                if let Some(booking) = self.bookings.iter_mut().find(|b| b.booking_id == booking_id) {
                    booking.status = status;
                }
                info!(booking_id, %status, "Booking status updated");
                Notification::success(format!("Booking status updated to {}", status))
            }
            Err(e) => {
                error!(booking_id, error = %e, "Error updating status");
                Notification::error(format!(
                    "Failed to update booking status: {}",
                    e.user_message()
                ))
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_booking(booking_id: i64, status: BookingStatus) -> BookingRecord {
    use chrono::{TimeZone, Utc};

    BookingRecord {
        booking_id,
        guest_id: Some(42),
        guest_name: "Nimal Perera".to_string(),
        phone: "0771234567".to_string(),
        num_guests: 2,
        check_in: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        check_out: Utc.with_ymd_and_hms(2025, 1, 4, 0, 0, 0).unwrap(),
        no_of_nights: 3,
        total_price: 15000.0,
        status,
    }
}
