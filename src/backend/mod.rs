pub mod dto;

use std::fmt;

use async_trait::async_trait;
use clap::ValueEnum;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::{EnrollRequest, UserId};

/// The enrollment call shapes the backend has exposed over time, in the
/// order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrollShape {
    /// `POST /user/enroll` with `{userId, trainingId}`.
    Body,
    /// `POST /user/enroll/{userId}/{programId}`.
    Path,
    /// `POST /allocations` with `{userId, trainingId}`.
    LegacyAllocation,
}

impl EnrollShape {
    pub fn label(&self) -> &'static str {
        match self {
            EnrollShape::Body => "body enroll",
            EnrollShape::Path => "path enroll",
            EnrollShape::LegacyAllocation => "legacy allocation",
        }
    }
}

impl fmt::Display for EnrollShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Collections an administrator can look up, save into and delete from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum AdminResource {
    User,
    Training,
    Allocation,
}

impl AdminResource {
    /// Path segment of the collection under the API base.
    pub fn segment(&self) -> &'static str {
        match self {
            AdminResource::User => "users",
            AdminResource::Training => "training",
            AdminResource::Allocation => "allocations",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdminResource::User => "user",
            AdminResource::Training => "training",
            AdminResource::Allocation => "allocation",
        }
    }
}

impl fmt::Display for AdminResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[async_trait]
pub trait TrainingApi: Send + Sync {
    async fn list_users(&self) -> Result<Value, AppError>;
    async fn list_trainings(&self) -> Result<Value, AppError>;
    async fn list_allocations(&self) -> Result<Value, AppError>;
    async fn get_record(&self, resource: AdminResource, id: &str) -> Result<Value, AppError>;
    async fn save_record(&self, resource: AdminResource, record: &Value)
    -> Result<Value, AppError>;
    async fn delete_record(&self, resource: AdminResource, id: &str) -> Result<Value, AppError>;
    async fn login(&self, request: &dto::LoginRequest) -> Result<dto::LoginResponse, AppError>;
    async fn signup(&self, request: &dto::SignupRequest) -> Result<dto::ApiMessage, AppError>;
    async fn available_programs(&self, user_id: &UserId) -> Result<Value, AppError>;
    async fn my_trainings(&self, user_id: &UserId) -> Result<Value, AppError>;
    async fn enroll(
        &self,
        shape: EnrollShape,
        request: &EnrollRequest,
    ) -> Result<dto::ApiMessage, AppError>;
}

pub struct HttpTrainingApi {
    client: Client,
    base_url: Url,
}

impl HttpTrainingApi {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        let base_url = Url::parse(config.api_url.trim_end_matches('/')).map_err(|e| {
            AppError::Config(format!("Invalid API URL {}: {}", config.api_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "Invalid API URL {}",
                config.api_url
            )));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends each segment percent-encoded, so ids never change the route.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute(&self, request: RequestBuilder, action: &str) -> Result<Value, AppError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            debug!("{} failed with {}: {}", action, status, body_text);
            return Err(AppError::Status {
                status,
                message: error_message(&body_text),
            });
        }

        let body_text = response.text().await?;
        Ok(parse_body(&body_text))
    }

    async fn get(&self, segments: &[&str]) -> Result<Value, AppError> {
        let url = self.endpoint(segments);
        let action = url.path().to_string();
        self.execute(self.client.get(url), &action).await
    }
}

fn parse_body(body_text: &str) -> Value {
    if body_text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body_text).unwrap_or_else(|e| {
        debug!("backend answered with non-JSON body: {}", e);
        Value::String(body_text.to_string())
    })
}

fn error_message(body_text: &str) -> Option<String> {
    serde_json::from_str::<Value>(body_text)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl TrainingApi for HttpTrainingApi {
    async fn list_users(&self) -> Result<Value, AppError> {
        self.get(&["users"]).await
    }

    async fn list_trainings(&self) -> Result<Value, AppError> {
        self.get(&["training"]).await
    }

    async fn list_allocations(&self) -> Result<Value, AppError> {
        self.get(&["allocations"]).await
    }

    async fn get_record(&self, resource: AdminResource, id: &str) -> Result<Value, AppError> {
        self.get(&[resource.segment(), id]).await
    }

    async fn save_record(
        &self,
        resource: AdminResource,
        record: &Value,
    ) -> Result<Value, AppError> {
        let request = self
            .client
            .post(self.endpoint(&[resource.segment()]))
            .json(record);
        self.execute(request, &format!("save {}", resource)).await
    }

    async fn delete_record(&self, resource: AdminResource, id: &str) -> Result<Value, AppError> {
        let request = self.client.delete(self.endpoint(&[resource.segment(), id]));
        self.execute(request, &format!("delete {}", resource)).await
    }

    async fn login(&self, request: &dto::LoginRequest) -> Result<dto::LoginResponse, AppError> {
        let body = self
            .execute(
                self.client.post(self.endpoint(&["login"])).json(request),
                "login",
            )
            .await?;
        if body.is_null() {
            return Ok(dto::LoginResponse::default());
        }
        Ok(serde_json::from_value(body)?)
    }

    async fn signup(&self, request: &dto::SignupRequest) -> Result<dto::ApiMessage, AppError> {
        let body = self
            .execute(
                self.client.post(self.endpoint(&["signup"])).json(request),
                "signup",
            )
            .await?;
        Ok(dto::ApiMessage::from_value(&body))
    }

    async fn available_programs(&self, user_id: &UserId) -> Result<Value, AppError> {
        self.get(&["user", "available-programs", user_id.as_str()])
            .await
    }

    async fn my_trainings(&self, user_id: &UserId) -> Result<Value, AppError> {
        self.get(&["user", "my-trainings", user_id.as_str()]).await
    }

    async fn enroll(
        &self,
        shape: EnrollShape,
        request: &EnrollRequest,
    ) -> Result<dto::ApiMessage, AppError> {
        let body = dto::EnrollBody {
            user_id: request.user_id().to_string(),
            training_id: request.program_id().clone(),
        };

        let builder = match shape {
            EnrollShape::Body => self
                .client
                .post(self.endpoint(&["user", "enroll"]))
                .json(&body),
            EnrollShape::Path => {
                let program_id = request.program_id().to_string();
                self.client.post(self.endpoint(&[
                    "user",
                    "enroll",
                    request.user_id().as_str(),
                    &program_id,
                ]))
            }
            EnrollShape::LegacyAllocation => self
                .client
                .post(self.endpoint(&["allocations"]))
                .json(&body),
        };

        let reply = self.execute(builder, shape.label()).await?;
        Ok(dto::ApiMessage::from_value(&reply))
    }
}
