// Owner dashboard: profile, the owner's properties and the bookings made by
// the signed-in user, with a confirm-before-delete flow for properties.
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, BookingRecord};
use crate::listing::{Listing, ListingId};
use crate::notification::Notification;
use crate::session::{CurrentUser, SessionContext};

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Loading,
    // The page hands over to the login screen
    LoginRequired,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteState {
    Idle,
    PendingDelete(ListingId),
    Deleting(ListingId),
    Confirmed(ListingId),
    Cancelled,
}

pub struct OwnerDashboard {
    api: Arc<dyn ApiClient>,
    session: SessionContext,
    state: DashboardState,
    user: Option<CurrentUser>,
    properties: Vec<Listing>,
    bookings: Vec<BookingRecord>,
    delete: DeleteState,
}

impl OwnerDashboard {
    pub fn new(api: Arc<dyn ApiClient>, session: SessionContext) -> Self {
        Self {
            api,
            session,
            state: DashboardState::Loading,
            user: None,
            properties: Vec::new(),
            bookings: Vec::new(),
            delete: DeleteState::Idle,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn delete_state(&self) -> DeleteState {
        self.delete
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self.delete, DeleteState::Deleting(_))
    }

    /// Loads the profile first; properties and bookings are fetched together
    /// afterwards and either may fail without hiding the other.
    pub async fn load(&mut self) -> &DashboardState {
        let Some(token) = self.session.token() else {
            self.state = DashboardState::LoginRequired;
            return &self.state;
        };

        let user = match self.api.profile(&token).await {
            Ok(user) => user,
            Err(e) if e.is_unauthorized() => {
                warn!(error = %e, "Session rejected by backend");
                self.session.invalidate();
                self.state = DashboardState::LoginRequired;
                return &self.state;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch profile");
                self.state = DashboardState::Failed(e.user_message());
                return &self.state;
            }
        };
        debug!(user_id = user.id, "Profile loaded");

        let (properties, bookings) = futures::join!(
            self.api.list_properties(&token),
            self.api.list_owner_bookings(&token)
        );

        match properties {
            Ok(properties) => self.properties = properties,
            Err(e) => warn!(error = %e, "Failed to fetch properties"),
        }
        match bookings {
            Ok(bookings) => self.bookings = bookings,
            Err(e) => warn!(error = %e, "Failed to fetch bookings"),
        }

        self.user = Some(user);
        self.state = DashboardState::Ready;
        &self.state
    }

    // Properties owned by the signed-in user
    pub fn my_properties(&self) -> Vec<&Listing> {
        let Some(user) = &self.user else {
            return Vec::new();
        };
        self.properties
            .iter()
            .filter(|p| p.owner_id == Some(user.id))
            .collect()
    }

    // Bookings the signed-in user made as a guest
    pub fn my_bookings(&self) -> Vec<&BookingRecord> {
        let Some(user) = &self.user else {
            return Vec::new();
        };
        self.bookings
            .iter()
            .filter(|b| b.guest_id == Some(user.id))
            .collect()
    }

    pub fn request_delete(&mut self, property_id: ListingId) {
        if self.is_deleting() {
            return;
        }
        self.delete = DeleteState::PendingDelete(property_id);
    }

    pub fn cancel_delete(&mut self) {
        if let DeleteState::PendingDelete(_) = self.delete {
            self.delete = DeleteState::Cancelled;
        }
    }

    /// Sends the DELETE for the pending property. Returns `None` when nothing
    /// is awaiting confirmation.
    pub async fn confirm_delete(&mut self) -> Option<Notification> {
        let DeleteState::PendingDelete(property_id) = self.delete else {
            return None;
        };
        let Some(token) = self.session.token() else {
            self.delete = DeleteState::Idle;
            self.state = DashboardState::LoginRequired;
            return Some(Notification::error("Please login first"));
        };

        self.delete = DeleteState::Deleting(property_id);
        match self.api.delete_property(&token, property_id).await {
            Ok(_) => {
                self.properties.retain(|p| p.id != Some(property_id));
                self.delete = DeleteState::Confirmed(property_id);
                info!(property_id, "Property deleted");
                Some(Notification::success("Property deleted successfully"))
            }
            Err(e) => {
                error!(property_id, error = %e, "Delete error");
                self.delete = DeleteState::Idle;
                Some(Notification::error(format!(
                    "Failed to delete property: {}",
                    e.user_message()
                )))
            }
        }
    }

    pub fn logout(&mut self) {
        self.session.invalidate();
        self.user = None;
        self.properties.clear();
        self.bookings.clear();
        self.delete = DeleteState::Idle;
        self.state = DashboardState::LoginRequired;
    }
}
