// Booking submission: turns a validated draft into a booking request and
// maps the backend's answer to a success or failure outcome.

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{ApiClient, BookingConfirmation, BookingRequest};
use crate::draft::BookingDraft;
use crate::listing::Listing;
use crate::pricing::{self, PricingStrategy};
use crate::session::CurrentUser;

pub const MISSING_LISTING: &str = "Package data is missing. Please try again from the homepage.";
pub const INVALID_GUESTS: &str = "Number of people must be a whole number above zero";
pub const MISSING_DATES: &str = "Please select check-in and check-out dates";

#[derive(Debug, Clone, PartialEq)]
pub enum BookingSubmissionResult {
    Success { confirmation: BookingConfirmation },
    Failure { message: String },
}

impl BookingSubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BookingSubmissionResult::Success { .. })
    }
}

/// Builds the request body. Fails without touching the network when the
/// listing lost its identity fields or the draft cannot be priced.
pub fn build_request(
    draft: &BookingDraft,
    listing: &Listing,
    user: &CurrentUser,
    strategy: PricingStrategy,
) -> Result<BookingRequest, &'static str> {
    let (Some(property_id), Some(owner_id)) = (listing.id, listing.owner_id) else {
        return Err(MISSING_LISTING);
    };
    let (check_in, check_out) = draft.dates.bounds().ok_or(MISSING_DATES)?;
    let guests = pricing::parse_guest_count(&draft.guests)
        .filter(|g| *g > 0)
        .ok_or(INVALID_GUESTS)?;
    let no_of_nights = pricing::nights(&draft.dates).unwrap_or(0);

    Ok(BookingRequest {
        property_id,
        owner_id,
        guest_id: user.id,
        full_name: draft.full_name.trim().to_string(),
        phone: draft.phone.trim().to_string(),
        guests,
        check_in,
        check_out,
        no_of_nights,
        total_price: pricing::compute_total(&listing.price, &draft.dates, &draft.guests, strategy),
    })
}

#[derive(Clone)]
pub struct SubmissionClient {
    api: Arc<dyn ApiClient>,
    strategy: PricingStrategy,
}

impl SubmissionClient {
    pub fn new(api: Arc<dyn ApiClient>, strategy: PricingStrategy) -> Self {
        Self { api, strategy }
    }

    pub fn strategy(&self) -> PricingStrategy {
        self.strategy
    }

    pub async fn submit(
        &self,
        draft: &BookingDraft,
        listing: &Listing,
        user: &CurrentUser,
    ) -> BookingSubmissionResult {
        let request = match build_request(draft, listing, user, self.strategy) {
            Ok(request) => request,
            Err(message) => {
                warn!(listing_id = ?listing.id, owner_id = ?listing.owner_id, reason = message, "Booking precondition failed");
                return BookingSubmissionResult::Failure {
                    message: message.to_string(),
                };
            }
        };

        match self.api.create_booking(&request).await {
            Ok(confirmation) => {
                info!(
                    listing_id = request.property_id,
                    booking_id = ?confirmation.booking_id,
                    total_price = request.total_price,
                    "Booking created"
                );
                BookingSubmissionResult::Success { confirmation }
            }
            Err(e) => {
                warn!(listing_id = request.property_id, error = %e, "Booking failed");
                BookingSubmissionResult::Failure {
                    message: e.user_message(),
                }
            }
        }
    }
}
