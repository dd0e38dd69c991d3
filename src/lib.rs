// Client library for the stay booking marketplace

// Pricing, validation and the booking flow
pub mod booking;
pub mod draft;
pub mod pricing;
pub mod submission;
pub mod validation;

// Backend contract and the reqwest client
pub mod api;
pub mod http;

// Pages around the booking flow
pub mod auth;
pub mod browser;
pub mod dashboard;
pub mod inbox;
pub mod listing;
pub mod notification;
pub mod property;
pub mod session;

// Re-export key types for convenience
pub use api::{
    ApiClient, ApiError, BookingConfirmation, BookingRecord, BookingRequest, BookingStatus,
    ClientConfig, ClientError, ClientStats,
};
pub use auth::{AuthField, AuthOutcome, AuthService, LoginForm, SignupForm};
pub use booking::{BookingPhase, BookingViewModel};
pub use browser::{ListingBrowser, ListingCard, ListingsState};
pub use dashboard::{DashboardState, DeleteState, OwnerDashboard};
pub use draft::{BookingDraft, DateRange, DateRangeError};
pub use http::HttpApiClient;
pub use inbox::{BookingInbox, InboxState};
pub use listing::{Listing, ListingId, OwnerId};
pub use notification::{Notification, NotificationLevel};
pub use pricing::{compute_total, PriceQuote, PricingStrategy};
pub use property::{ImageUpload, PropertyDraft, PropertyForm, PropertyType};
pub use session::{
    CurrentUser, FileSessionStore, MemorySessionStore, Session, SessionContext, SessionError,
    SessionStore,
};
pub use submission::{BookingSubmissionResult, SubmissionClient};
pub use validation::{validate, Field, ValidationErrors};
