// reqwest-backed implementation of `ApiClient`
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::api::*;
use crate::listing::{Listing, ListingId};
use crate::property::PropertySubmission;
use crate::session::CurrentUser;

pub struct HttpApiClient {
    config: ClientConfig,
    http: Client,
    stats: Mutex<ClientStats>,
}

impl HttpApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        Ok(Self {
            config,
            http,
            stats: Mutex::new(ClientStats::default()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // Sends the request and hands back status and raw body; JSON mapping is
    // left to the caller so bookings can apply their own rules.
    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<(u16, String), ApiError> {
        let started = Instant::now();
        let outcome = self.send(request).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let succeeded = matches!(&outcome, Ok((status, _)) if (200..300).contains(status));
        self.stats.lock().record(succeeded, elapsed_ms);

        match &outcome {
            Ok((status, _)) => debug!(endpoint = path, status, elapsed_ms, "Backend responded"),
            Err(e) => warn!(endpoint = path, error = %e, "Request failed"),
        }
        outcome
    }

    async fn send(&self, request: RequestBuilder) -> Result<(u16, String), ApiError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        Ok((status, body))
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.config.timeout_ms)
        } else {
            ApiError::NetworkError(error.to_string())
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let mut request = self.http.get(self.config.endpoint(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let (status, body) = self.execute(request, path).await?;
        parse_json_response(status, &body, fallback)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn list_packages(&self) -> Result<Vec<Listing>, ApiError> {
        self.get_json(PACKAGES_PATH, None, "Failed to fetch properties")
            .await
    }

    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, ApiError> {
        debug!(
            listing_id = request.property_id,
            guest_id = request.guest_id,
            nights = request.no_of_nights,
            "Creating booking"
        );
        let builder = self.http.post(self.config.endpoint(BOOK_PATH)).json(request);
        let (status, body) = self.execute(builder, BOOK_PATH).await?;
        parse_booking_response(status, &body)
    }

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, ApiError> {
        let builder = self.http.get(self.config.endpoint(ALL_BOOKINGS_PATH));
        let (status, body) = self.execute(builder, ALL_BOOKINGS_PATH).await?;
        unwrap_bookings(&body, status)
    }

    async fn list_owner_bookings(&self, token: &str) -> Result<Vec<BookingRecord>, ApiError> {
        let builder = self
            .http
            .get(self.config.endpoint(OWNER_BOOKINGS_PATH))
            .bearer_auth(token);
        let (status, body) = self.execute(builder, OWNER_BOOKINGS_PATH).await?;
        unwrap_bookings(&body, status)
    }

    async fn update_booking_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> Result<Ack, ApiError> {
        let path = format!("{}/{}", BOOKING_STATUS_PATH, booking_id);
        let builder = self
            .http
            .patch(self.config.endpoint(&path))
            .json(&serde_json::json!({ "status": status }));
        let (code, body) = self.execute(builder, &path).await?;
        if !(200..300).contains(&code) {
            // The inbox shows the raw reply on failure
            return Err(ApiError::ApiResponseError {
                status_code: code,
                message: format!("Server responded with {}: {}", code, body),
            });
        }
        parse_json_response(code, &body, "Failed to update booking status")
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let builder = self
            .http
            .post(self.config.endpoint(LOGIN_PATH))
            .json(credentials);
        let (status, body) = self.execute(builder, LOGIN_PATH).await?;
        parse_json_response(
            status,
            &body,
            "Login failed. Please check your credentials.",
        )
    }

    async fn register(&self, registration: &Registration) -> Result<Ack, ApiError> {
        let builder = self
            .http
            .post(self.config.endpoint(REGISTER_PATH))
            .json(registration);
        let (status, body) = self.execute(builder, REGISTER_PATH).await?;
        parse_json_response(status, &body, "Failed to create account")
    }

    async fn profile(&self, token: &str) -> Result<CurrentUser, ApiError> {
        let builder = self
            .http
            .get(self.config.endpoint(PROFILE_PATH))
            .bearer_auth(token);
        let (status, body) = self.execute(builder, PROFILE_PATH).await?;
        unwrap_profile(&body, status)
    }

    async fn list_properties(&self, token: &str) -> Result<Vec<Listing>, ApiError> {
        self.get_json(PROPERTIES_PATH, Some(token), "Failed to fetch properties")
            .await
    }

    async fn register_property(
        &self,
        token: &str,
        property: &PropertySubmission,
    ) -> Result<Ack, ApiError> {
        let facilities = serde_json::to_string(&property.facilities)
            .map_err(|e| ApiError::ClientError(e.to_string()))?;

        let mut form = Form::new()
            .text("title", property.title.clone())
            .text("description", property.description.clone())
            .text("location", property.location.clone())
            .text("price", property.price.clone())
            .text("property_type", property.property_type.label().to_string())
            .text("facilities", facilities);

        for image in &property.images {
            let part = Part::bytes(image.data.to_vec())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| ApiError::ClientError(e.to_string()))?;
            form = form.part("images", part);
        }

        let builder = self
            .http
            .post(self.config.endpoint(REGISTER_PROPERTY_PATH))
            .bearer_auth(token)
            .multipart(form);
        let (status, body) = self.execute(builder, REGISTER_PROPERTY_PATH).await?;
        parse_json_response(status, &body, "Failed to upload property")
    }

    async fn delete_property(&self, token: &str, property_id: ListingId) -> Result<Ack, ApiError> {
        let path = format!("{}/{}", DELETE_PROPERTY_PATH, property_id);
        let builder = self
            .http
            .delete(self.config.endpoint(&path))
            .bearer_auth(token);
        let (status, body) = self.execute(builder, &path).await?;
        parse_json_response(status, &body, "Failed to delete property")
    }

    fn stats(&self) -> ClientStats {
        self.stats.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_config() {
        let config = ClientConfig {
            base_url: "ftp://bookings".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            HttpApiClient::new(config),
            Err(ClientError::ConfigError(_))
        ));
    }

    #[test]
    fn test_builds_with_defaults() {
        let client = HttpApiClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.config().timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(client.stats(), ClientStats::default());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_network_error() {
        let client = HttpApiClient::new(ClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_ms: 2000,
            ..ClientConfig::default()
        })
        .unwrap();

        let err = client.list_packages().await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::NetworkError(_) | ApiError::Timeout(_)
        ));
        assert_eq!(client.stats().requests_failed, 1);
    }
}
