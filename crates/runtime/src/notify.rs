use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Body of `POST <endpoint>/green`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GreenRequestBody<'a> {
    pub signal_id: &'a str,
    pub action: &'static str,
}

impl<'a> GreenRequestBody<'a> {
    pub fn new(signal_id: &'a str) -> Self {
        Self {
            signal_id,
            action: "green",
        }
    }
}

pub fn green_url(endpoint: &str) -> String {
    format!("{endpoint}/green")
}

#[async_trait]
pub trait SignalNotifier: Send + Sync {
    /// Asks the controller at `endpoint` to switch `signal_id` to green.
    /// Any completed exchange counts as delivered; the status code is returned
    /// for the log.
    async fn request_green(&self, endpoint: &str, signal_id: &str) -> Result<u16, NotifyError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpNotifier {
    client: reqwest::Client,
}

impl HttpNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SignalNotifier for HttpNotifier {
    async fn request_green(&self, endpoint: &str, signal_id: &str) -> Result<u16, NotifyError> {
        let response = self
            .client
            .post(green_url(endpoint))
            .json(&GreenRequestBody::new(signal_id))
            .send()
            .await?;

        Ok(response.status().as_u16())
    }
}
