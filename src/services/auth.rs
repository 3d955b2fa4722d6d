use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::TrainingApi;
use crate::backend::dto::{LoginRequest, SignupRequest};
use crate::db::SessionRepository;
use crate::error::AppError;
use crate::models::{Role, SessionContext, SignupForm, UserId};

pub const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password.";
pub const SIGNUP_MISSING_FIELDS_MESSAGE: &str = "Please fill all required fields.";
pub const SIGNUP_FAILED_MESSAGE: &str = "Signup failed";
pub const SIGNUP_SUCCESS_MESSAGE: &str = "Signup successful. Please log in.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupOutcome {
    pub message: String,
    /// Email to pre-fill on the login form.
    pub email: String,
}

#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn TrainingApi>,
    sessions: Arc<dyn SessionRepository>,
}

impl AuthService {
    pub fn new(api: Arc<dyn TrainingApi>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { api, sessions }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionContext, AppError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response = match self.api.login(&request).await {
            Ok(response) => response,
            Err(AppError::Status { message, status }) => {
                warn!("login rejected with {}", status);
                return Err(AppError::Rejected(
                    message.unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string()),
                ));
            }
            Err(e) => return Err(e),
        };

        if !response.success {
            return Err(AppError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string()),
            ));
        }

        let user = response.user.unwrap_or_default();
        let role = user.role.as_deref().and_then(Role::parse);
        let user_id = user.id.as_ref().and_then(UserId::from_value);

        if let Some(id) = &user_id {
            self.sessions.set(id).await?;
        }

        info!(
            "logged in as {} with role {}",
            user_id.as_ref().map(UserId::as_str).unwrap_or("<unknown>"),
            role.map(|r| r.as_str()).unwrap_or("<none>")
        );
        Ok(SessionContext::signed_in(user_id, role))
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<SignupOutcome, AppError> {
        let request = SignupRequest {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            password: form.password.clone(),
            role: form.role.trim().to_string(),
        };

        if request.name.is_empty()
            || request.email.is_empty()
            || request.password.is_empty()
            || request.role.is_empty()
        {
            return Err(AppError::BadRequest(
                SIGNUP_MISSING_FIELDS_MESSAGE.to_string(),
            ));
        }

        let reply = match self.api.signup(&request).await {
            Ok(reply) => reply,
            Err(AppError::Status { message, .. }) => {
                return Err(AppError::Rejected(
                    message.unwrap_or_else(|| SIGNUP_FAILED_MESSAGE.to_string()),
                ));
            }
            Err(e) => return Err(e),
        };

        if reply.success == Some(false) {
            return Err(AppError::Rejected(
                reply
                    .message
                    .unwrap_or_else(|| SIGNUP_FAILED_MESSAGE.to_string()),
            ));
        }

        info!("signed up {}", request.email);
        Ok(SignupOutcome {
            message: reply
                .message
                .unwrap_or_else(|| SIGNUP_SUCCESS_MESSAGE.to_string()),
            email: request.email,
        })
    }

    pub async fn logout(&self) -> Result<SessionContext, AppError> {
        self.sessions.clear().await?;
        info!("logged out");
        Ok(SessionContext::Anonymous)
    }

    /// Stored identity for the user-facing views.
    pub async fn current_user(&self) -> Result<UserId, AppError> {
        self.sessions.get().await?.ok_or(AppError::NotLoggedIn)
    }

    pub async fn stored_user(&self) -> Result<Option<UserId>, AppError> {
        self.sessions.get().await
    }
}
