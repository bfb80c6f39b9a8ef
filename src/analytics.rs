//! Fire-and-forget product analytics.
//!
//! The controller is handed an [`AnalyticsEmitter`] when it is constructed.
//! Outside production that emitter is [`NoopAnalytics`], so no call site has
//! to branch on the deployment mode.  Emission never blocks and never fails
//! the caller.

use std::fmt;
use std::sync::Arc;

use reqwest::Client as ReqwestClient;
use serde::Serialize;
use serde_json::json;
use url::Url;

use crate::config::{DeploymentConfig, base_for_join};
use crate::error::{Error, Result};
use crate::identity::SessionId;
use crate::observability::{ANALYTICS_EVENTS, ANALYTICS_FAILURES};

/// The kinds of event the controller reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    /// The bot-name bootstrap succeeded.
    #[serde(rename = "fetched-bot-name")]
    FetchedBotName,

    /// A user turn was dispatched to the agent.
    #[serde(rename = "sent-message")]
    SentMessage,
}

impl EventKind {
    /// The event name as reported to the analytics sink.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::FetchedBotName => "fetched-bot-name",
            EventKind::SentMessage => "sent-message",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One analytics notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsEvent {
    /// What happened.
    pub kind: EventKind,
    /// The session the event belongs to.
    pub session_id: SessionId,
    /// The page location at the time of the event.
    pub page_url: Url,
}

impl AnalyticsEvent {
    /// Create a new event.
    pub fn new(kind: EventKind, session_id: SessionId, page_url: Url) -> Self {
        Self {
            kind,
            session_id,
            page_url,
        }
    }
}

/// A sink for analytics notifications.
pub trait AnalyticsEmitter: Send + Sync {
    /// Reports an event without waiting for delivery.
    fn emit(&self, event: AnalyticsEvent);

    /// Returns true if emitted events leave the process.
    fn is_enabled(&self) -> bool {
        true
    }
}

impl<A: AnalyticsEmitter + ?Sized> AnalyticsEmitter for Arc<A> {
    fn emit(&self, event: AnalyticsEvent) {
        (**self).emit(event)
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

impl<A: AnalyticsEmitter + ?Sized> AnalyticsEmitter for Box<A> {
    fn emit(&self, event: AnalyticsEvent) {
        (**self).emit(event)
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl AnalyticsEmitter for NoopAnalytics {
    fn emit(&self, event: AnalyticsEvent) {
        tracing::trace!(event = %event.kind, "analytics disabled; dropping event");
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Posts events to a PostHog-compatible capture endpoint.
#[derive(Clone)]
pub struct PostHogAnalytics {
    client: ReqwestClient,
    capture_url: Url,
    api_key: String,
}

impl PostHogAnalytics {
    /// Create an emitter for the given ingestion host and project key.
    pub fn new(host: &Url, api_key: impl Into<String>) -> Result<Self> {
        let capture_url = base_for_join(host).join("capture/")?;
        let client = ReqwestClient::builder().build().map_err(|e| {
            Error::http_client(
                format!("Failed to build analytics client: {}", e),
                Some(Box::new(e)),
            )
        })?;
        Ok(Self {
            client,
            capture_url,
            api_key: api_key.into(),
        })
    }

    /// The endpoint events are posted to.
    pub fn capture_url(&self) -> &Url {
        &self.capture_url
    }

    /// The JSON body posted for one event.
    pub fn payload(&self, event: &AnalyticsEvent) -> serde_json::Value {
        json!({
            "api_key": self.api_key,
            "event": event.kind,
            "distinct_id": event.session_id,
            "properties": {
                "$current_url": event.page_url.as_str(),
            },
        })
    }
}

impl fmt::Debug for PostHogAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostHogAnalytics")
            .field("capture_url", &self.capture_url.as_str())
            .finish_non_exhaustive()
    }
}

impl AnalyticsEmitter for PostHogAnalytics {
    fn emit(&self, event: AnalyticsEvent) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            ANALYTICS_FAILURES.click();
            tracing::warn!(event = %event.kind, "no async runtime; analytics event dropped");
            return;
        };
        ANALYTICS_EVENTS.click();
        let request = self
            .client
            .post(self.capture_url.clone())
            .json(&self.payload(&event));
        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(event = %event.kind, session_id = %event.session_id, "analytics event delivered");
                }
                Ok(response) => {
                    ANALYTICS_FAILURES.click();
                    tracing::warn!(event = %event.kind, status = response.status().as_u16(), "analytics sink rejected event");
                }
                Err(err) => {
                    ANALYTICS_FAILURES.click();
                    tracing::warn!(event = %event.kind, error = %err, "analytics event not delivered");
                }
            }
        });
    }
}

/// Chooses the emitter for a deployment.
///
/// Production with an analytics key posts to PostHog; everything else gets
/// [`NoopAnalytics`].
pub fn analytics_for(config: &DeploymentConfig) -> Result<Box<dyn AnalyticsEmitter>> {
    match (&config.analytics_key, config.mode.is_production()) {
        (Some(key), true) => Ok(Box::new(PostHogAnalytics::new(
            &config.analytics_host,
            key.clone(),
        )?)),
        (None, true) => {
            tracing::info!("no analytics key configured; analytics disabled");
            Ok(Box::new(NoopAnalytics))
        }
        (_, false) => Ok(Box::new(NoopAnalytics)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind) -> AnalyticsEvent {
        AnalyticsEvent::new(
            kind,
            SessionId::create(),
            Url::parse("https://chat.example.com/chat").unwrap(),
        )
    }

    #[test]
    fn event_names() {
        assert_eq!(EventKind::FetchedBotName.name(), "fetched-bot-name");
        assert_eq!(EventKind::SentMessage.to_string(), "sent-message");
    }

    #[test]
    fn capture_url_keeps_host_path() {
        let host = Url::parse("https://analytics.example.com/ingest").unwrap();
        let analytics = PostHogAnalytics::new(&host, "phc_123").unwrap();
        assert_eq!(
            analytics.capture_url().as_str(),
            "https://analytics.example.com/ingest/capture/"
        );
    }

    #[test]
    fn payload_shape() {
        let host = Url::parse("https://app.posthog.com").unwrap();
        let analytics = PostHogAnalytics::new(&host, "phc_123").unwrap();
        assert_eq!(
            analytics.capture_url().as_str(),
            "https://app.posthog.com/capture/"
        );
        let event = event(EventKind::SentMessage);
        let payload = analytics.payload(&event);
        assert_eq!(payload["api_key"], "phc_123");
        assert_eq!(payload["event"], "sent-message");
        assert_eq!(payload["distinct_id"], event.session_id.to_string());
        assert_eq!(
            payload["properties"]["$current_url"],
            "https://chat.example.com/chat"
        );
    }

    #[test]
    fn emit_without_runtime_does_not_panic() {
        let host = Url::parse("http://127.0.0.1:9").unwrap();
        let analytics = PostHogAnalytics::new(&host, "phc_123").unwrap();
        analytics.emit(event(EventKind::FetchedBotName));
    }

    #[test]
    fn debug_hides_key() {
        let host = Url::parse("https://app.posthog.com").unwrap();
        let analytics = PostHogAnalytics::new(&host, "phc_secret").unwrap();
        assert!(!format!("{analytics:?}").contains("phc_secret"));
    }

    #[test]
    fn development_gets_noop() {
        let config = DeploymentConfig::development("http://localhost:8000")
            .unwrap()
            .with_analytics_key(Some("phc_123".to_string()));
        let emitter = analytics_for(&config).unwrap();
        assert!(!emitter.is_enabled());
        emitter.emit(event(EventKind::SentMessage));
    }

    #[test]
    fn production_without_key_gets_noop() {
        let config = DeploymentConfig::production("http://localhost:8000", "secret").unwrap();
        assert!(config.analytics_key.is_none());
        assert!(!analytics_for(&config).unwrap().is_enabled());
    }

    #[test]
    fn production_with_key_posts_events() {
        let config = DeploymentConfig::production("http://localhost:8000", "secret")
            .unwrap()
            .with_analytics_key(Some("phc_123".to_string()));
        assert!(analytics_for(&config).unwrap().is_enabled());
    }

    #[test]
    fn wrappers_forward_enablement() {
        assert!(!Arc::new(NoopAnalytics).is_enabled());
        let host = Url::parse("https://app.posthog.com").unwrap();
        let live: Box<dyn AnalyticsEmitter> =
            Box::new(PostHogAnalytics::new(&host, "phc_123").unwrap());
        assert!(live.is_enabled());
    }
}
