// REST contract with the marketplace backend: error types, client
// configuration, wire payloads and the `ApiClient` trait every page talks to.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::listing::{Listing, ListingId, OwnerId};
use crate::pricing::PricingStrategy;
use crate::property::PropertySubmission;
use crate::session::CurrentUser;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    #[error("{0}")]
    InvalidResponse(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

impl ApiError {
    // Text shown to the user in a notification
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ApiResponseError { message, .. } => message.clone(),
            ApiError::Unauthorized(message) => message.clone(),
            ApiError::InvalidResponse(message) => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub pricing: PricingStrategy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            pricing: PricingStrategy::default(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ClientError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::ConfigError(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::ConfigError(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

pub const PACKAGES_PATH: &str = "/package/viewAllPackages";
pub const BOOK_PATH: &str = "/api/bookings/book";
pub const ALL_BOOKINGS_PATH: &str = "/api/bookings/all";
pub const OWNER_BOOKINGS_PATH: &str = "/api/bookings/all-bookings";
pub const BOOKING_STATUS_PATH: &str = "/api/bookings/status";
pub const LOGIN_PATH: &str = "/users/login";
pub const REGISTER_PATH: &str = "/users/register";
pub const PROFILE_PATH: &str = "/users/profile";
pub const PROPERTIES_PATH: &str = "/properties/viewAllProperty";
pub const REGISTER_PROPERTY_PATH: &str = "/properties/registerProperty";
pub const DELETE_PROPERTY_PATH: &str = "/properties/deleteProperty";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClientStats {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
    pub average_response_time_ms: f64,
    pub max_response_time_ms: f64,
}

impl ClientStats {
    pub fn record(&mut self, succeeded: bool, elapsed_ms: f64) {
        self.requests_sent += 1;
        if succeeded {
            self.requests_succeeded += 1;
        } else {
            self.requests_failed += 1;
        }

        let n = self.requests_sent as f64;
        self.average_response_time_ms += (elapsed_ms - self.average_response_time_ms) / n;
        self.max_response_time_ms = self.max_response_time_ms.max(elapsed_ms);
    }
}

// Body of POST /api/bookings/book
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub property_id: ListingId,
    pub owner_id: OwnerId,
    pub guest_id: i64,
    pub full_name: String,
    pub phone: String,
    pub guests: u64,
    #[serde(serialize_with = "iso_millis")]
    pub check_in: DateTime<Utc>,
    #[serde(serialize_with = "iso_millis")]
    pub check_out: DateTime<Utc>,
    pub no_of_nights: u64,
    pub total_price: u64,
}

// `2025-01-01T00:00:00.000Z`, the format browsers send
fn iso_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct BookingConfirmation {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "bookingId")]
    pub booking_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

// A booking as listed in the inbox and on the owner dashboard
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingRecord {
    pub booking_id: i64,
    #[serde(default)]
    pub guest_id: Option<i64>,
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub num_guests: u64,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    #[serde(default)]
    pub no_of_nights: u64,
    #[serde(default)]
    pub total_price: f64,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BookingsEnvelope {
    #[serde(default)]
    bookings: Vec<BookingRecord>,
}

pub fn unwrap_bookings(body: &str, status_code: u16) -> Result<Vec<BookingRecord>, ApiError> {
    let envelope: BookingsEnvelope =
        parse_json_response(status_code, body, "Failed to fetch bookings")?;
    Ok(envelope.bookings)
}

#[derive(Debug, Clone, Deserialize)]
struct ProfileEnvelope {
    user: CurrentUser,
}

// GET /users/profile answers `{ user }`
pub fn unwrap_profile(body: &str, status_code: u16) -> Result<CurrentUser, ApiError> {
    let envelope: ProfileEnvelope =
        parse_json_response(status_code, body, "Failed to fetch profile data")?;
    Ok(envelope.user)
}

// Generic acknowledgement. Registration also reports `success` and may carry
// an `error` alongside a 2xx status.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Ack {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.success == Some(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: CurrentUser,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[async_trait]
pub trait ApiClient: Send + Sync + 'static {
    // GET /package/viewAllPackages
    async fn list_packages(&self) -> Result<Vec<Listing>, ApiError>;

    // POST /api/bookings/book
    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, ApiError>;

    // GET /api/bookings/all
    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, ApiError>;

    // GET /api/bookings/all-bookings, scoped to the signed-in owner
    async fn list_owner_bookings(&self, token: &str) -> Result<Vec<BookingRecord>, ApiError>;

    // PATCH /api/bookings/status/:id
    async fn update_booking_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> Result<Ack, ApiError>;

    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError>;

    async fn register(&self, registration: &Registration) -> Result<Ack, ApiError>;

    async fn profile(&self, token: &str) -> Result<CurrentUser, ApiError>;

    async fn list_properties(&self, token: &str) -> Result<Vec<Listing>, ApiError>;

    // Multipart POST /properties/registerProperty
    async fn register_property(
        &self,
        token: &str,
        property: &PropertySubmission,
    ) -> Result<Ack, ApiError>;

    async fn delete_property(&self, token: &str, property_id: ListingId) -> Result<Ack, ApiError>;

    fn stats(&self) -> ClientStats;
}

const EXCERPT_CHARS: usize = 100;

pub fn excerpt(body: &str) -> String {
    body.chars().take(EXCERPT_CHARS).collect()
}

fn invalid_json(body: &str) -> ApiError {
    ApiError::InvalidResponse(format!(
        "Server returned invalid JSON: {}...",
        excerpt(body)
    ))
}

// The backend reports failures as `{ message }` on bookings and `{ error }`
// everywhere else.
pub fn error_message(value: &serde_json::Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .find(|message| !message.trim().is_empty())
        .map(str::to_string)
}

fn is_success(status_code: u16) -> bool {
    (200..300).contains(&status_code)
}

/// Maps a booking-creation response. The body is parsed before the status is
/// looked at, so an HTML error page surfaces as an invalid-JSON failure with
/// an excerpt of the raw text.
pub fn parse_booking_response(
    status_code: u16,
    body: &str,
) -> Result<BookingConfirmation, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|_| invalid_json(body))?;

    if !is_success(status_code) {
        return Err(ApiError::ApiResponseError {
            status_code,
            message: error_message(&value).unwrap_or_else(|| "Booking failed".to_string()),
        });
    }

    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Maps any other JSON response: non-2xx statuses carry the backend's
/// `message`/`error` when present, `fallback` otherwise.
pub fn parse_json_response<T: DeserializeOwned>(
    status_code: u16,
    body: &str,
    fallback: &str,
) -> Result<T, ApiError> {
    if !is_success(status_code) {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| error_message(&value))
            .unwrap_or_else(|| fallback.to_string());

        if status_code == 401 {
            return Err(ApiError::Unauthorized(message));
        }
        return Err(ApiError::ApiResponseError {
            status_code,
            message,
        });
    }

    serde_json::from_str(body).map_err(|_| invalid_json(body))
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test]
    fn test_booking_request_wire_format() {
        let request = BookingRequest {
            property_id: 7,
            owner_id: 3,
            guest_id: 42,
            full_name: "Nimal Perera".to_string(),
            phone: "0771234567".to_string(),
            guests: 2,
            check_in: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            check_out: Utc.with_ymd_and_hms(2025, 1, 4, 0, 0, 0).unwrap(),
            no_of_nights: 3,
            total_price: 15000,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "propertyId": 7,
                "ownerId": 3,
                "guestId": 42,
                "fullName": "Nimal Perera",
                "phone": "0771234567",
                "guests": 2,
                "checkIn": "2025-01-01T00:00:00.000Z",
                "checkOut": "2025-01-04T00:00:00.000Z",
                "noOfNights": 3,
                "totalPrice": 15000
            })
        );
    }

    #[test]
    fn test_booking_success_response() {
        let confirmation =
            parse_booking_response(201, r#"{"message":"Booking created","bookingId":9}"#).unwrap();
        assert_eq!(confirmation.booking_id, Some(9));
    }

    #[test_case(500, r#"{"message":"Room already taken"}"#, "Room already taken"; "backend message")]
    #[test_case(400, r#"{"error":"Invalid dates"}"#, "Invalid dates"; "error key")]
    #[test_case(500, r#"{}"#, "Booking failed"; "generic fallback")]
    fn test_booking_error_response(status: u16, body: &str, expected: &str) {
        let err = parse_booking_response(status, body).unwrap_err();
        match err {
            ApiError::ApiResponseError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, status);
                assert_eq!(message, expected);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_booking_html_body_is_invalid_json_with_excerpt() {
        let body = format!("<html>{}</html>", "x".repeat(300));
        let err = parse_booking_response(502, &body).unwrap_err();
        let message = err.user_message();
        assert!(message.starts_with("Server returned invalid JSON: <html>"));
        assert!(message.ends_with("..."));
        assert_eq!(
            message.len(),
            "Server returned invalid JSON: ".len() + 100 + "...".len()
        );
    }

    #[test]
    fn test_unauthorized_is_distinguished() {
        let err = parse_json_response::<CurrentUser>(401, r#"{"error":"jwt expired"}"#, "x")
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "jwt expired");
    }

    #[test]
    fn test_bookings_envelope() {
        let body = r#"{"bookings":[{
            "booking_id": 11, "guest_id": 42, "guest_name": "Nimal", "phone": "077",
            "num_guests": 2, "check_in": "2025-01-01T00:00:00.000Z",
            "check_out": "2025-01-04T00:00:00.000Z", "no_of_nights": 3,
            "total_price": 15000, "status": "confirmed"
        }]}"#;
        let bookings = unwrap_bookings(body, 200).unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].status, BookingStatus::Confirmed);

        assert!(unwrap_bookings("{}", 200).unwrap().is_empty());
        assert_eq!(
            unwrap_bookings("oops", 500).unwrap_err().user_message(),
            "Failed to fetch bookings"
        );
    }

    #[test]
    fn test_profile_envelope() {
        let user = unwrap_profile(
            r#"{"user":{"id":42,"first_name":"Amara","last_name":"Silva","email":"a@x.io"}}"#,
            200,
        )
        .unwrap();
        assert_eq!(user.name(), "Amara Silva");
        assert!(unwrap_profile("{}", 200).is_err());
    }

    #[test]
    fn test_config_validation_and_endpoints() {
        let config = ClientConfig {
            base_url: "http://localhost:5000/".to_string(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(
            config.endpoint(BOOK_PATH),
            "http://localhost:5000/api/bookings/book"
        );

        let bad = ClientConfig {
            base_url: "localhost:5000".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ClientError::ConfigError(_))));

        let zero = ClientConfig {
            timeout_ms: 0,
            ..ClientConfig::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_stats_track_outcomes() {
        let mut stats = ClientStats::default();
        stats.record(true, 10.0);
        stats.record(false, 30.0);
        assert_eq!(stats.requests_sent, 2);
        assert_eq!(stats.requests_succeeded, 1);
        assert_eq!(stats.requests_failed, 1);
        assert_eq!(stats.average_response_time_ms, 20.0);
        assert_eq!(stats.max_response_time_ms, 30.0);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Confirmed".parse(), Ok(BookingStatus::Confirmed));
        assert_eq!("canceled".parse(), Ok(BookingStatus::Cancelled));
        assert!("archived".parse::<BookingStatus>().is_err());
    }
}
