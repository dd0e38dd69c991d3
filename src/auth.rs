// Login and signup forms
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, LoginRequest, Registration};
use crate::notification::Notification;
use crate::session::{Session, SessionContext};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AuthField {
    FirstName,
    LastName,
    Email,
    Password,
    ConfirmPassword,
}

impl AuthField {
    pub fn name(&self) -> &'static str {
        match self {
            AuthField::FirstName => "firstName",
            AuthField::LastName => "lastName",
            AuthField::Email => "email",
            AuthField::Password => "password",
            AuthField::ConfirmPassword => "confirmPassword",
        }
    }
}

impl fmt::Display for AuthField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORD_WEAK: &str = "Password must be at least 6 characters with letters and numbers";
pub const PASSWORDS_DIFFER: &str = "Passwords do not match";
pub const FIRST_NAME_REQUIRED: &str = "First name is required";
pub const LAST_NAME_REQUIRED: &str = "Last name is required";

pub const LOGIN_SUCCEEDED: &str = "Login successful!";
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
pub const SIGNUP_SUCCEEDED: &str = "Account created successfully! Please login.";
pub const SIGNUP_FAILED: &str = "Failed to create account";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> ValidationErrors<AuthField> {
        let mut errors = ValidationErrors::new();
        if self.email.trim().is_empty() {
            errors.add(AuthField::Email, EMAIL_REQUIRED);
        }
        if self.password.is_empty() {
            errors.add(AuthField::Password, PASSWORD_REQUIRED);
        }
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

// At least six ASCII letters or digits, with one of each
pub fn is_strong_password(password: &str) -> bool {
    password.len() >= 6
        && password.chars().all(|c| c.is_ascii_alphanumeric())
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

impl SignupForm {
    /// Later checks on the same field replace earlier ones, so a blank email
    /// reports as invalid rather than missing.
    pub fn validate(&self) -> ValidationErrors<AuthField> {
        let mut errors = ValidationErrors::new();
        if self.first_name.trim().is_empty() {
            errors.add(AuthField::FirstName, FIRST_NAME_REQUIRED);
        }
        if self.last_name.trim().is_empty() {
            errors.add(AuthField::LastName, LAST_NAME_REQUIRED);
        }
        if self.email.trim().is_empty() {
            errors.add(AuthField::Email, EMAIL_REQUIRED);
        }
        if !self.email.contains('@') {
            errors.add(AuthField::Email, EMAIL_INVALID);
        }
        if self.password.is_empty() {
            errors.add(AuthField::Password, PASSWORD_REQUIRED);
        }
        if !is_strong_password(&self.password) {
            errors.add(AuthField::Password, PASSWORD_WEAK);
        }
        if self.password != self.confirm_password {
            errors.add(AuthField::ConfirmPassword, PASSWORDS_DIFFER);
        }
        errors
    }

    fn to_registration(&self) -> Registration {
        Registration {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

// Outcome of a form submission: field errors stop before the network
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Invalid(ValidationErrors<AuthField>),
    Done(Notification),
}

pub struct AuthService {
    api: Arc<dyn ApiClient>,
    session: SessionContext,
}

impl AuthService {
    pub fn new(api: Arc<dyn ApiClient>, session: SessionContext) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub async fn login(&self, form: &LoginForm) -> AuthOutcome {
        let errors = form.validate();
        if !errors.is_empty() {
            return AuthOutcome::Invalid(errors);
        }

        let credentials = LoginRequest {
            email: form.email.clone(),
            password: form.password.clone(),
        };
        let response = match self.api.login(&credentials).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Login failed");
                // Only a backend reply carries a message worth showing
                let message = match e {
                    ApiError::ApiResponseError { message, .. } | ApiError::Unauthorized(message) => {
                        message
                    }
                    _ => LOGIN_FAILED.to_string(),
                };
                return AuthOutcome::Done(Notification::error(message));
            }
        };

        let user_id = response.user.id;
        let session = Session {
            token: response.token,
            user: response.user,
        };
        if let Err(e) = self.session.establish(session) {
            // Signed in for this run; the next start will ask again
            warn!(error = %e, "Failed to persist session");
        }
        info!(user_id, "Logged in");
        AuthOutcome::Done(Notification::success(LOGIN_SUCCEEDED))
    }

    pub async fn register(&self, form: &SignupForm) -> AuthOutcome {
        let errors = form.validate();
        if !errors.is_empty() {
            return AuthOutcome::Invalid(errors);
        }

        match self.api.register(&form.to_registration()).await {
            Ok(ack) if ack.is_rejected() => {
                let message = ack.error.unwrap_or_else(|| SIGNUP_FAILED.to_string());
                warn!(reason = %message, "Signup rejected");
                AuthOutcome::Done(Notification::error(message))
            }
            Ok(_) => {
                info!(email = %form.email.trim(), "Account created");
                AuthOutcome::Done(Notification::success(SIGNUP_SUCCEEDED))
            }
            Err(e) => {
                warn!(error = %e, "Signup failed");
                AuthOutcome::Done(Notification::error(e.user_message()))
            }
        }
    }

    pub fn logout(&self) {
        self.session.invalidate();
    }
}
