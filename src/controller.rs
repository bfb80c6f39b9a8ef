//! The conversation session controller.
//!
//! A [`SessionController`] owns one session: its identity, the conversation
//! and trace logs, the typing indicator, and what it has learned about the
//! agent (display name, model, conversational stage).
//!
//! # Ordering
//!
//! [`SessionController::submit`] appends the user turn and raises the typing
//! indicator before it returns, so user turns land in submission order.  The
//! returned future performs the network exchange; the agent turn and its
//! trace entry are appended when that future completes.  Submissions are not
//! serialized: when two dispatches overlap, agent turns and trace entries
//! land in completion order, and a reply that resolves late is still
//! appended.  There is no cancellation, but dropping a pending future
//! releases its hold on the typing indicator without appending anything.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use url::Url;

use crate::analytics::{AnalyticsEmitter, AnalyticsEvent, EventKind};
use crate::client::ChatTransport;
use crate::config::DeploymentConfig;
use crate::error::{Error, Result};
use crate::history::{ConversationLog, TraceLog};
use crate::identity::SessionId;
use crate::observability::{
    BOT_NAME_FAILURES, BOT_NAME_FETCHES, DISPATCH_DURATION, DISPATCH_FAILURES,
    DISPATCH_SKIPPED, DISPATCH_SUCCESSES, DISPATCH_UNSUPPORTED, DISPATCHES,
};
use crate::typing::{TypingGuard, TypingIndicator};
use crate::types::{ChatReply, DispatchRequest, DispatchResponse, TraceEntry, Turn};

/// How a submission ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The input was empty after trimming; nothing was appended or sent.
    Skipped,

    /// The agent answered and both logs were extended.
    Replied(AgentReply),
}

impl DispatchOutcome {
    /// Returns the agent's reply, if there was one.
    pub fn reply(&self) -> Option<&AgentReply> {
        match self {
            DispatchOutcome::Replied(reply) => Some(reply),
            DispatchOutcome::Skipped => None,
        }
    }
}

/// A successful agent reply as appended to the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    /// The 1-based position of this reply among agent turns.
    pub index: usize,
    /// The agent turn appended to the conversation log.
    pub turn: Turn,
    /// The trace entry appended to the trace log.
    pub trace: TraceEntry,
    /// The bot name the reply was signed with.
    pub bot_name: String,
}

/// What the controller knows about the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AgentProfile {
    bot_name: String,
    model: Option<String>,
    conversational_stage: Option<String>,
}

/// A point-in-time view of the whole session, for renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The session identifier.
    pub session_id: SessionId,
    /// The agent's display name; empty until known.
    pub bot_name: String,
    /// The model serving the agent, if reported.
    pub model: Option<String>,
    /// The most recent conversational stage, if any reply has arrived.
    pub conversational_stage: Option<String>,
    /// Every turn so far.
    pub turns: Vec<Turn>,
    /// Every trace entry so far.
    pub trace: Vec<TraceEntry>,
    /// Whether the typing indicator is up.
    pub typing: bool,
    /// How many dispatches are in flight.
    pub in_flight: usize,
}

/// A user turn that has been recorded and is waiting on the network.
struct PendingDispatch {
    request: DispatchRequest,
    typing: TypingGuard,
    started: Instant,
}

/// Sequences user and agent turns for one chat session.
pub struct SessionController<T: ChatTransport, A: AnalyticsEmitter> {
    transport: T,
    analytics: A,
    page_url: Url,
    session_id: SessionId,
    conversation: ConversationLog,
    trace: TraceLog,
    typing: TypingIndicator,
    stream: AtomicBool,
    profile: Mutex<AgentProfile>,
}

impl<T: ChatTransport, A: AnalyticsEmitter> SessionController<T, A> {
    /// Creates a controller with a freshly minted session identity.
    pub fn new(transport: T, analytics: A, config: &DeploymentConfig) -> Self {
        let session_id = SessionId::create();
        tracing::debug!(
            %session_id,
            mode = %config.mode,
            analytics = analytics.is_enabled(),
            "session created"
        );
        Self {
            transport,
            analytics,
            page_url: config.page_url.clone(),
            session_id,
            conversation: ConversationLog::new(),
            trace: TraceLog::new(),
            typing: TypingIndicator::new(),
            stream: AtomicBool::new(false),
            profile: Mutex::new(AgentProfile::default()),
        }
    }

    /// Performs the one-time work done when a chat is opened.
    ///
    /// The bot-name fetch is best effort: a failure is logged and the
    /// previous name is kept.
    pub async fn mount(&self) -> Option<String> {
        self.fetch_bot_name().await.ok()
    }

    /// Fetches the agent's display name and remembers it.
    ///
    /// Never touches the conversation or trace logs.
    pub async fn fetch_bot_name(&self) -> Result<String> {
        BOT_NAME_FETCHES.click();
        match self.transport.bot_name().await {
            Ok(response) => {
                {
                    let mut profile = self.profile();
                    profile.bot_name = response.name.clone();
                    if response.model.is_some() {
                        profile.model = response.model.clone();
                    }
                }
                tracing::debug!(session_id = %self.session_id, bot_name = %response.name, "fetched bot name");
                self.emit(EventKind::FetchedBotName);
                Ok(response.name)
            }
            Err(err) => {
                BOT_NAME_FAILURES.click();
                tracing::warn!(session_id = %self.session_id, error = %err, "failed to fetch the bot's name");
                Err(err)
            }
        }
    }

    /// Submits one user turn.
    ///
    /// Before this returns, the trimmed text has been appended to the
    /// conversation log and the typing indicator is up.  Empty or
    /// whitespace-only input appends nothing, sends nothing, and resolves to
    /// [`DispatchOutcome::Skipped`].
    ///
    /// The returned future performs the exchange.  On success the agent turn
    /// and trace entry are appended.  On failure nothing more is appended, the
    /// failure is logged, and the error is returned.  The typing indicator is
    /// released when the future completes or is dropped.
    pub fn submit<'a>(
        &'a self,
        human_say: &str,
    ) -> impl Future<Output = Result<DispatchOutcome>> + Send + use<'a, T, A> {
        let pending = self.begin(human_say);
        async move {
            match pending {
                Some(pending) => self.dispatch(pending).await,
                None => Ok(DispatchOutcome::Skipped),
            }
        }
    }

    fn begin(&self, human_say: &str) -> Option<PendingDispatch> {
        let text = human_say.trim();
        if text.is_empty() {
            DISPATCH_SKIPPED.click();
            return None;
        }
        DISPATCHES.click();
        self.conversation.append(Turn::user(text));
        let typing = self.typing.begin();
        Some(PendingDispatch {
            request: DispatchRequest::new(self.session_id, text, self.stream()),
            typing,
            started: Instant::now(),
        })
    }

    async fn dispatch(&self, pending: PendingDispatch) -> Result<DispatchOutcome> {
        let PendingDispatch {
            request,
            typing,
            started,
        } = pending;
        let result = self.exchange(&request).await;
        DISPATCH_DURATION.add(started.elapsed().as_secs_f64());
        let outcome = match result {
            Ok(response) => {
                DISPATCH_SUCCESSES.click();
                Ok(DispatchOutcome::Replied(self.record(response)))
            }
            Err(err) => {
                DISPATCH_FAILURES.click();
                if err.is_unsupported() {
                    DISPATCH_UNSUPPORTED.click();
                }
                tracing::error!(session_id = %self.session_id, error = %err, "failed to fetch the bot's response");
                Err(err)
            }
        };
        drop(typing);
        outcome
    }

    async fn exchange(&self, request: &DispatchRequest) -> Result<DispatchResponse> {
        if request.stream {
            return Err(Error::unsupported("streaming responses"));
        }
        self.emit(EventKind::SentMessage);
        match self.transport.chat(request).await? {
            ChatReply::Complete(response) => Ok(response),
            ChatReply::Streaming => Err(Error::unsupported("streaming responses")),
        }
    }

    // The profile lock is held across both appends so that concurrent
    // completions cannot interleave and misalign the two logs.
    fn record(&self, response: DispatchResponse) -> AgentReply {
        let trace = TraceEntry::from(&response);
        let turn = Turn::agent(response.response);
        let index = {
            let mut profile = self.profile();
            self.conversation.append(turn.clone());
            let index = self.trace.append(trace.clone());
            profile.bot_name = response.bot_name.clone();
            profile.conversational_stage = Some(response.conversational_stage);
            if response.model_name.is_some() {
                profile.model = response.model_name;
            }
            index
        };
        tracing::debug!(session_id = %self.session_id, index, stage = %trace.conversational_stage, "agent replied");
        AgentReply {
            index,
            turn,
            trace,
            bot_name: response.bot_name,
        }
    }

    fn emit(&self, kind: EventKind) {
        self.analytics.emit(AnalyticsEvent::new(
            kind,
            self.session_id,
            self.page_url.clone(),
        ));
    }

    fn profile(&self) -> MutexGuard<'_, AgentProfile> {
        self.profile.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The session identifier.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// The conversation log.
    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    /// The trace log.
    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    /// The typing indicator.
    pub fn typing(&self) -> &TypingIndicator {
        &self.typing
    }

    /// Returns true while any dispatch is in flight.
    pub fn is_typing(&self) -> bool {
        self.typing.is_typing()
    }

    /// The agent's display name; empty until it is known.
    pub fn bot_name(&self) -> String {
        self.profile().bot_name.clone()
    }

    /// The model serving the agent, if reported.
    pub fn model(&self) -> Option<String> {
        self.profile().model.clone()
    }

    /// The most recent conversational stage.
    pub fn conversational_stage(&self) -> Option<String> {
        self.profile().conversational_stage.clone()
    }

    /// Whether new dispatches ask for incremental replies.
    pub fn stream(&self) -> bool {
        self.stream.load(Ordering::SeqCst)
    }

    /// Sets the streaming capability flag for subsequent dispatches.
    pub fn set_stream(&self, stream: bool) {
        self.stream.store(stream, Ordering::SeqCst);
    }

    /// Returns a consistent view of the session for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        // Held while both logs are read; `record` appends under the same lock.
        let profile = self.profile();
        SessionSnapshot {
            session_id: self.session_id,
            bot_name: profile.bot_name.clone(),
            model: profile.model.clone(),
            conversational_stage: profile.conversational_stage.clone(),
            turns: self.conversation.all(),
            trace: self.trace.all(),
            typing: self.typing.is_typing(),
            in_flight: self.typing.in_flight(),
        }
    }
}

impl<T: ChatTransport, A: AnalyticsEmitter> std::fmt::Debug for SessionController<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("session_id", &self.session_id)
            .field("turns", &self.conversation.len())
            .field("trace", &self.trace.len())
            .field("in_flight", &self.typing.in_flight())
            .finish_non_exhaustive()
    }
}
