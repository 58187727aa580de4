use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use crate::config::WriteConfig;
use crate::message::WriteRequest;

/// Outcome reporting for the write in flight. `busy` goes true for the
/// duration of each call so the UI can hold off re-submission; `error` holds
/// the last completed write's failure text, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteStatus {
    pub busy: bool,
    pub error: Option<String>,
}

/// Posts single command values to the gateway's write endpoint.
///
/// One write per call, no queueing and no retry: a failed write is terminal
/// for that attempt and the operator triggers it again. Callers are expected
/// to gate new writes on `busy`; the writer itself does not reject overlap.
pub struct CommandWriter {
    http: reqwest::Client,
    write_url: String,
    status: watch::Sender<WriteStatus>,
}

impl CommandWriter {
    pub fn new(config: &WriteConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        let (status, _) = watch::channel(WriteStatus::default());

        Ok(Self {
            http,
            write_url: config.url.clone(),
            status,
        })
    }

    pub fn status(&self) -> watch::Receiver<WriteStatus> {
        self.status.subscribe()
    }

    /// Performs one remote write. Whatever happens on the wire, the status
    /// transitions busy → idle exactly once, with `error` describing a
    /// non-success response or a transport failure.
    pub async fn write(&self, name: &str, value: Value) {
        self.status.send_replace(WriteStatus {
            busy: true,
            error: None,
        });

        let error = self.perform(name, value).await.err();

        self.status.send_replace(WriteStatus { busy: false, error });
    }

    async fn perform(&self, name: &str, value: Value) -> std::result::Result<(), String> {
        let request = WriteRequest {
            name: name.to_string(),
            value,
        };

        let response = self
            .http
            .post(&self.write_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status.is_success() {
            debug!(name = %request.name, "Write accepted");
            return Ok(());
        }

        // Prefer the server's own explanation, fall back to the bare code.
        let detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("detail")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .filter(|detail| !detail.is_empty());

        Err(detail.unwrap_or_else(|| format!("HTTP {}", status.as_u16())))
    }
}
