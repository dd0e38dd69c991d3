// Property registration form for owners
use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::notification::Notification;
use crate::session::SessionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyType {
    Homestay,
    Pods,
    #[default]
    Hotels,
    Premium,
}

impl PropertyType {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::Homestay => "Homestay",
            PropertyType::Pods => "Pods",
            PropertyType::Hotels => "Hotels",
            PropertyType::Premium => "Premium",
        }
    }
}

// Offerings an owner can tick on the form
pub const FACILITIES: [&str; 9] = [
    "Family stay",
    "Parking",
    "Hot bathtub",
    "Taxi service",
    "Dinner accommodation",
    "WiFi",
    "Child environment",
    "Tea / Coffee",
    "Good food",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }
}

// Validated, trimmed payload sent as multipart form data
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySubmission {
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: String,
    pub property_type: PropertyType,
    pub facilities: Vec<String>,
    pub images: Vec<ImageUpload>,
}

pub const LOGIN_REQUIRED: &str = "Please login first";
pub const FIELDS_REQUIRED: &str = "Please fill in all required fields";
pub const IMAGE_REQUIRED: &str = "Please select at least one image";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: String,
    pub property_type: PropertyType,
    pub facilities: Vec<String>,
    pub images: Vec<ImageUpload>,
}

impl PropertyDraft {
    // Adds the facility, or removes it when already ticked. Unknown
    // offerings are ignored.
    pub fn toggle_facility(&mut self, facility: &str) -> bool {
        if !FACILITIES.contains(&facility) {
            return false;
        }
        if let Some(pos) = self.facilities.iter().position(|f| f == facility) {
            self.facilities.remove(pos);
        } else {
            self.facilities.push(facility.to_string());
        }
        true
    }

    pub fn preview(&self) -> Option<&ImageUpload> {
        self.images.first()
    }

    /// Checks the form the way the upload button does and produces the
    /// payload, or the message to show.
    pub fn to_submission(&self) -> Result<PropertySubmission, &'static str> {
        let title = self.title.trim();
        let description = self.description.trim();
        let location = self.location.trim();
        let price = self.price.trim();

        if title.is_empty() || description.is_empty() || location.is_empty() || price.is_empty() {
            return Err(FIELDS_REQUIRED);
        }
        if self.images.is_empty() {
            return Err(IMAGE_REQUIRED);
        }

        Ok(PropertySubmission {
            title: title.to_string(),
            description: description.to_string(),
            location: location.to_string(),
            price: price.to_string(),
            property_type: self.property_type,
            facilities: self.facilities.clone(),
            images: self.images.clone(),
        })
    }
}

pub struct PropertyForm {
    api: Arc<dyn ApiClient>,
    session: SessionContext,
    pub draft: PropertyDraft,
}

impl PropertyForm {
    pub fn new(api: Arc<dyn ApiClient>, session: SessionContext) -> Self {
        Self {
            api,
            session,
            draft: PropertyDraft::default(),
        }
    }

    pub async fn submit(&mut self) -> Notification {
        let Some(token) = self.session.token() else {
            return Notification::error(LOGIN_REQUIRED);
        };

        let submission = match self.draft.to_submission() {
            Ok(submission) => submission,
            Err(message) => return Notification::error(message),
        };

        match self.api.register_property(&token, &submission).await {
            Ok(_) => {
                info!(title = %submission.title, images = submission.images.len(), "Property uploaded");
                self.draft = PropertyDraft::default();
                Notification::success("Property uploaded successfully!")
            }
            Err(e) => {
                warn!(error = %e, "Property upload failed");
                Notification::error(e.user_message())
            }
        }
    }
}
