// Form validation for the booking page
use std::collections::BTreeMap;
use std::fmt;

use crate::draft::BookingDraft;

// Booking form fields that can carry an inline error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FullName,
    Phone,
    Guests,
    Dates,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::FullName => "fullName",
            Field::Phone => "phone",
            Field::Guests => "guests",
            Field::Dates => "dates",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field name to message. An empty set is the only success signal; there is
/// no partially valid state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors<F: Ord = Field> {
    errors: BTreeMap<F, String>,
}

impl<F: Ord> Default for ValidationErrors<F> {
    fn default() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }
}

impl<F: Ord + Copy> ValidationErrors<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: F, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: F) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn clear(&mut self, field: F) -> bool {
        self.errors.remove(&field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> + '_ {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

pub const NAME_REQUIRED: &str = "Name is required";
pub const PHONE_REQUIRED: &str = "Phone is required";
pub const GUESTS_REQUIRED: &str = "Number of people is required";
pub const DATES_REQUIRED: &str = "Please select check-in and check-out dates";

pub fn validate(draft: &BookingDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.full_name.trim().is_empty() {
        errors.add(Field::FullName, NAME_REQUIRED);
    }
    if draft.phone.trim().is_empty() {
        errors.add(Field::Phone, PHONE_REQUIRED);
    }
    if draft.guests.trim().is_empty() {
        errors.add(Field::Guests, GUESTS_REQUIRED);
    }
    if !draft.dates.is_complete() {
        errors.add(Field::Dates, DATES_REQUIRED);
    }

    errors
}
