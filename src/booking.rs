// Booking page view-model.
//
// Holds the draft for one listing and drives it through
// Idle -> Editing -> Validating -> Submitting -> Succeeded | Failed.
// Succeeded and Failed are resting states: the next edit goes back to
// Editing and the submit control is enabled again.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::api::{ApiClient, BookingConfirmation};
use crate::draft::{BookingDraft, DateRange, DateRangeError};
use crate::listing::Listing;
use crate::notification::Notification;
use crate::pricing::{self, PriceQuote, PricingStrategy};
use crate::session::SessionContext;
use crate::submission::{BookingSubmissionResult, SubmissionClient};
use crate::validation::{self, Field, ValidationErrors};

pub const LOGIN_TO_BOOK: &str = "Please login to make a booking";
pub const BOOKING_SUCCEEDED: &str = "Booking successful!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingPhase {
    Idle,
    Editing,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

pub struct BookingViewModel {
    listing: Listing,
    session: SessionContext,
    submitter: SubmissionClient,
    draft: BookingDraft,
    errors: ValidationErrors,
    phase: BookingPhase,
    notifications: Vec<Notification>,
    last_confirmation: Option<BookingConfirmation>,
    today: Option<NaiveDate>,
}

impl BookingViewModel {
    pub fn new(
        listing: Listing,
        api: Arc<dyn ApiClient>,
        session: SessionContext,
        strategy: PricingStrategy,
    ) -> Self {
        Self {
            listing,
            session,
            submitter: SubmissionClient::new(api, strategy),
            draft: BookingDraft::new(),
            errors: ValidationErrors::new(),
            phase: BookingPhase::Idle,
            notifications: Vec::new(),
            last_confirmation: None,
            today: None,
        }
    }

    // Pins "today" for the date picker's lower bound
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn phase(&self) -> BookingPhase {
        self.phase
    }

    pub fn strategy(&self) -> PricingStrategy {
        self.submitter.strategy()
    }

    pub fn last_confirmation(&self) -> Option<&BookingConfirmation> {
        self.last_confirmation.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == BookingPhase::Submitting
    }

    // Whether the submit button is enabled
    pub fn can_submit(&self) -> bool {
        !matches!(
            self.phase,
            BookingPhase::Submitting | BookingPhase::Validating
        )
    }

    pub fn total_price(&self) -> u64 {
        pricing::compute_total(
            &self.listing.price,
            &self.draft.dates,
            &self.draft.guests,
            self.strategy(),
        )
    }

    // Price summary; only worth showing once the total is positive
    pub fn quote(&self) -> Option<PriceQuote> {
        pricing::quote(
            &self.listing.price,
            &self.draft.dates,
            &self.draft.guests,
            self.strategy(),
        )
        .filter(|q| q.total > 0)
    }

    fn edit(&mut self, field: Field) {
        self.errors.clear(field);
        self.phase = BookingPhase::Editing;
    }

    pub fn set_full_name(&mut self, value: impl Into<String>) {
        self.draft.full_name = value.into();
        self.edit(Field::FullName);
    }

    pub fn set_phone(&mut self, value: impl Into<String>) {
        self.draft.phone = value.into();
        self.edit(Field::Phone);
    }

    pub fn set_guests(&mut self, value: impl Into<String>) {
        self.draft.guests = value.into();
        self.edit(Field::Guests);
    }

    /// Applies a date picker selection. Selections the picker would not
    /// allow are rejected and leave the view-model untouched.
    pub fn select_dates(
        &mut self,
        check_in: Option<DateTime<Utc>>,
        check_out: Option<DateTime<Utc>>,
    ) -> Result<(), DateRangeError> {
        self.draft.dates = DateRange::select(check_in, check_out, self.today())?;
        self.edit(Field::Dates);
        Ok(())
    }

    pub fn clear_dates(&mut self) {
        self.draft.dates.clear();
        self.edit(Field::Dates);
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub async fn submit(&mut self) -> BookingPhase {
        let resting = self.phase;
        self.phase = BookingPhase::Validating;

        let errors = validation::validate(&self.draft);
        if !errors.is_empty() {
            let fields: Vec<Field> = errors.fields().collect();
            debug!(?fields, "Booking form invalid");
            self.errors = errors;
            self.phase = BookingPhase::Editing;
            return self.phase;
        }
        self.errors = errors;

        let Some(user) = self.session.current_user() else {
            self.notifications.push(Notification::error(LOGIN_TO_BOOK));
            self.phase = resting;
            return self.phase;
        };

        self.phase = BookingPhase::Submitting;
        let result = self
            .submitter
            .submit(&self.draft, &self.listing, &user)
            .await;

        match result {
            BookingSubmissionResult::Success { confirmation } => {
                self.draft.reset();
                self.last_confirmation = Some(confirmation);
                self.notifications
                    .push(Notification::success(BOOKING_SUCCEEDED));
                self.phase = BookingPhase::Succeeded;
            }
            BookingSubmissionResult::Failure { message } => {
                self.notifications
                    .push(Notification::error(format!("Booking failed: {}", message)));
                self.phase = BookingPhase::Failed;
            }
        }
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_server::{MockServer, Route};
    use crate::draft::start_of_day;
    use crate::session::{test_session, MemorySessionStore};
    use crate::submission::MISSING_LISTING;
    use crate::validation::{DATES_REQUIRED, NAME_REQUIRED};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn listing() -> Listing {
        Listing {
            id: Some(7),
            owner_id: Some(3),
            owner_name: "Kasun".to_string(),
            title: "Ella Retreat".to_string(),
            price: "Rs. 2,500".to_string(),
            ..Listing::default()
        }
    }

    fn signed_in() -> SessionContext {
        SessionContext::restore(Arc::new(MemorySessionStore::with_session(test_session())))
    }

    fn view_model(server: &Arc<MockServer>, session: SessionContext) -> BookingViewModel {
        BookingViewModel::new(
            listing(),
            server.clone(),
            session,
            PricingStrategy::PerGuestPerNight,
        )
        .with_today(day(1))
    }

    fn fill(vm: &mut BookingViewModel) {
        vm.set_full_name("Nimal Perera");
        vm.set_phone("0771234567");
        vm.set_guests("2");
        vm.select_dates(Some(start_of_day(day(1))), Some(start_of_day(day(4))))
            .unwrap();
    }

    #[test]
    fn test_starts_idle_and_moves_to_editing() {
        let server = Arc::new(MockServer::new());
        let mut vm = view_model(&server, signed_in());
        assert_eq!(vm.phase(), BookingPhase::Idle);
        assert!(vm.draft().is_empty());
        assert_eq!(vm.total_price(), 0);

        vm.set_guests("3");
        assert_eq!(vm.phase(), BookingPhase::Editing);
    }

    #[test]
    fn test_total_tracks_every_price_input() {
        let server = Arc::new(MockServer::new());
        let mut vm = view_model(&server, signed_in());
        fill(&mut vm);
        assert_eq!(vm.total_price(), 15000);

        vm.set_guests("3");
        assert_eq!(vm.total_price(), 22500);

        vm.select_dates(Some(start_of_day(day(2))), Some(start_of_day(day(4))))
            .unwrap();
        assert_eq!(vm.quote().map(|q| q.nights), Some(2));
        assert_eq!(vm.total_price(), 15000);

        vm.clear_dates();
        assert_eq!(vm.total_price(), 0);
        assert_eq!(vm.quote(), None);
    }

    #[test]
    fn test_per_night_strategy() {
        let server = Arc::new(MockServer::new());
        let mut vm = BookingViewModel::new(
            listing(),
            server.clone(),
            signed_in(),
            PricingStrategy::PerNight,
        )
        .with_today(day(1));
        fill(&mut vm);
        assert_eq!(vm.total_price(), 7500);
    }

    #[test]
    fn test_rejected_date_selection_leaves_state_alone() {
        let server = Arc::new(MockServer::new());
        let mut vm = view_model(&server, signed_in());
        fill(&mut vm);

        let before = vm.draft().dates;
        let result = vm.select_dates(Some(start_of_day(day(5))), Some(start_of_day(day(3))));
        assert!(result.is_err());
        assert_eq!(vm.draft().dates, before);

        let past = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert!(vm.select_dates(Some(start_of_day(past)), None).is_err());
    }

    #[tokio::test]
    async fn test_invalid_form_blocks_submission() {
        let server = Arc::new(MockServer::new());
        let mut vm = view_model(&server, signed_in());
        vm.set_phone("0771234567");

        let phase = vm.submit().await;

        assert_eq!(phase, BookingPhase::Editing);
        assert_eq!(vm.errors().get(Field::FullName), Some(NAME_REQUIRED));
        assert_eq!(vm.errors().get(Field::Dates), Some(DATES_REQUIRED));
        assert_eq!(server.request_count(), 0);
        assert!(vm.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_editing_clears_only_that_fields_error() {
        let server = Arc::new(MockServer::new());
        let mut vm = view_model(&server, signed_in());
        vm.submit().await;
        assert_eq!(vm.errors().len(), 4);

        vm.set_full_name("N");
        assert!(!vm.errors().contains(Field::FullName));
        assert_eq!(vm.errors().len(), 3);

        vm.set_full_name("");
        assert!(!vm.errors().contains(Field::FullName));
    }

    #[tokio::test]
    async fn test_signed_out_user_is_asked_to_login() {
        let server = Arc::new(MockServer::new());
        let mut vm = view_model(&server, SessionContext::anonymous());
        fill(&mut vm);

        let phase = vm.submit().await;

        assert_eq!(phase, BookingPhase::Editing);
        assert_eq!(server.request_count(), 0);
        assert_eq!(server.stats().requests_sent, 0);
        assert_eq!(
            vm.take_notifications(),
            vec![Notification::error(LOGIN_TO_BOOK)]
        );
        assert_eq!(vm.draft().full_name, "Nimal Perera");
    }

    #[tokio::test]
    async fn test_server_error_keeps_draft_and_reenables_submit() {
        let server = Arc::new(MockServer::new());
        server.fail_next_requests(1);
        let mut vm = view_model(&server, signed_in());
        fill(&mut vm);
        let filled = vm.draft().clone();

        let phase = vm.submit().await;

        assert_eq!(phase, BookingPhase::Failed);
        assert_eq!(vm.draft(), &filled);
        assert!(vm.can_submit());
        assert!(!vm.is_submitting());
        assert_eq!(
            vm.take_notifications(),
            vec![Notification::error("Booking failed: Internal Server Error")]
        );

        // retry with the preserved draft goes through
        assert_eq!(vm.submit().await, BookingPhase::Succeeded);
        assert_eq!(server.calls_to(Route::Book), 2);
    }

    #[tokio::test]
    async fn test_success_clears_draft() {
        let server = Arc::new(MockServer::new());
        let mut vm = view_model(&server, signed_in());
        fill(&mut vm);

        let phase = vm.submit().await;

        assert_eq!(phase, BookingPhase::Succeeded);
        assert!(vm.draft().is_empty());
        assert_eq!(vm.draft().dates, DateRange::empty());
        assert_eq!(vm.total_price(), 0);
        assert!(vm.can_submit());
        assert!(vm.last_confirmation().is_some());
        assert_eq!(
            vm.take_notifications(),
            vec![Notification::success(BOOKING_SUCCEEDED)]
        );

        let sent = server.booking_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].guest_id, 42);
        assert_eq!(sent[0].total_price, 15000);

        vm.set_full_name("Next guest");
        assert_eq!(vm.phase(), BookingPhase::Editing);
    }

    #[tokio::test]
    async fn test_listing_without_owner_fails_without_network() {
        let server = Arc::new(MockServer::new());
        let mut vm = BookingViewModel::new(
            Listing {
                owner_id: None,
                ..listing()
            },
            server.clone(),
            signed_in(),
            PricingStrategy::default(),
        )
        .with_today(day(1));
        fill(&mut vm);

        assert_eq!(vm.submit().await, BookingPhase::Failed);
        assert_eq!(server.request_count(), 0);
        assert_eq!(
            vm.take_notifications(),
            vec![Notification::error(format!(
                "Booking failed: {}",
                MISSING_LISTING
            ))]
        );
    }

    #[test]
    fn test_logout_is_seen_by_open_booking_page() {
        let server = Arc::new(MockServer::new());
        let session = signed_in();
        let mut vm = view_model(&server, session.clone());
        fill(&mut vm);

        session.invalidate();

        let phase = tokio_test::block_on(vm.submit());
        assert_eq!(phase, BookingPhase::Editing);
        assert_eq!(server.request_count(), 0);
    }
}
