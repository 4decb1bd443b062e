use crate::models::{DayRecord, ErrorResponse, FieldPatch};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("{0} is not in the loaded week")]
    UnknownDate(NaiveDate),
    #[error("breakfast time can only be set while breakfast is yes")]
    TimeNotEditable,
    #[error("invalid breakfast time '{0}'")]
    InvalidTime(String),
}

/// The two calls the controller makes against the meal service.
#[async_trait]
pub trait MealsApi: Send + Sync {
    async fn fetch_window(&self) -> Result<Vec<DayRecord>, ClientError>;
    async fn write_field(&self, patch: &FieldPatch) -> Result<(), ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpMealsApi {
    client: Client,
    base_url: String,
}

impl HttpMealsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/meals", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl MealsApi for HttpMealsApi {
    async fn fetch_window(&self) -> Result<Vec<DayRecord>, ClientError> {
        let response = check(self.client.get(self.endpoint()).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn write_field(&self, patch: &FieldPatch) -> Result<(), ClientError> {
        check(self.client.post(self.endpoint()).json(patch).send().await?).await?;
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
