/// Workflow result stream subscription
///
/// Opens the server's result event stream in a background task and forwards decoded
/// `WorkflowResult`s over a channel. The editor drains the channel on its own schedule, so
/// results are applied in arrival order between user events.

use crate::api::{AccessTokenProvider, HttpPlaybookClient};
use crate::error::{Result, StudioError};
use crate::runtime::sse::SseParser;
use crate::workflow::WorkflowResult;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Message delivered by a subscription
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Result(WorkflowResult),
    /// The stream broke; nothing more will arrive
    Failed(String),
}

/// Live subscription to the result stream; dropping it closes the connection
#[derive(Debug)]
pub struct ResultSubscription {
    rx: mpsc::UnboundedReceiver<StreamMessage>,
    task: JoinHandle<()>,
}

impl ResultSubscription {
    /// Subscribe to the result stream at `stream_path` below the server root
    ///
    /// A fresh access token is fetched first and carried in the subscription address.
    pub async fn connect(
        client: &HttpPlaybookClient,
        stream_path: &str,
        auth: &dyn AccessTokenProvider,
    ) -> Result<Self> {
        let token = auth.access_token().await?;
        let url = client.stream_url(stream_path, &token)?;
        let http = client.http().clone();

        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            tracing::info!("📡 Subscribing to workflow results");
            let reason = match pump(http, url, &tx).await {
                Ok(()) => "Result stream closed by server".to_string(),
                Err(e) => e.to_string(),
            };
            tracing::warn!("📴 {}", reason);
            let _ = tx.send(StreamMessage::Failed(reason));
        });

        Ok(Self { rx, task })
    }

    /// Subscription fed from an existing channel (scripted sessions, tests)
    pub fn from_channel(rx: mpsc::UnboundedReceiver<StreamMessage>) -> Self {
        Self {
            rx,
            task: tokio::spawn(async {}),
        }
    }

    /// Next message if one is already waiting
    pub fn try_next(&mut self) -> Option<StreamMessage> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next message; `None` once the stream is gone
    pub async fn next(&mut self) -> Option<StreamMessage> {
        self.rx.recv().await
    }

    /// Stop the background reader
    pub fn close(&mut self) {
        self.task.abort();
        self.rx.close();
    }
}

impl Drop for ResultSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Read the event stream until it ends, forwarding each decoded result
async fn pump(http: reqwest::Client, url: reqwest::Url, tx: &mpsc::UnboundedSender<StreamMessage>) -> Result<()> {
    let response = http
        .get(url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(|e| StudioError::StreamFailure(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(StudioError::StreamFailure(format!("HTTP {}", status)));
    }

    let mut parser = SseParser::new();
    let mut bytes = response.bytes_stream();

    while let Some(chunk) = bytes.next().await {
        let chunk = chunk.map_err(|e| StudioError::StreamFailure(e.to_string()))?;

        for event in parser.feed(&chunk) {
            if !event.is_message() {
                continue;
            }
            match serde_json::from_str::<WorkflowResult>(&event.data) {
                Ok(result) => {
                    if tx.send(StreamMessage::Result(result)).is_err() {
                        // receiver dropped, nobody is listening anymore
                        return Ok(());
                    }
                }
                Err(e) => tracing::warn!("⚠️ Skipping malformed workflow result: {}", e),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(uid: &str) -> WorkflowResult {
        WorkflowResult {
            step_uid: uid.into(),
            kind: "SUCCESS".into(),
            name: None,
            result: None,
        }
    }

    #[tokio::test]
    async fn test_channel_subscription_delivers_in_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscription = ResultSubscription::from_channel(rx);

        tx.send(StreamMessage::Result(result("a"))).unwrap();
        tx.send(StreamMessage::Result(result("b"))).unwrap();

        assert_eq!(subscription.try_next(), Some(StreamMessage::Result(result("a"))));
        assert_eq!(subscription.next().await, Some(StreamMessage::Result(result("b"))));
        assert_eq!(subscription.try_next(), None);

        drop(tx);
        assert_eq!(subscription.next().await, None);
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_failure() {
        let client = HttpPlaybookClient::new(reqwest::Client::new(), "http://127.0.0.1:9").unwrap();
        let auth = crate::api::StaticToken("t".into());
        let mut subscription = ResultSubscription::connect(&client, "stream", &auth)
            .await
            .unwrap();

        match subscription.next().await {
            Some(StreamMessage::Failed(reason)) => assert!(reason.starts_with("Result stream failed")),
            other => panic!("expected a failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_error_is_a_stream_failure() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let url = reqwest::Url::parse("http://127.0.0.1:9/stream").unwrap();
        let result = pump(reqwest::Client::new(), url, &tx).await;
        assert!(matches!(result, Err(StudioError::StreamFailure(_))));
    }
}
