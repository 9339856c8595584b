//! Conversation session: transcript plus the single in-flight question.
//!
//! A [`ConversationSession`] is a plain state container. [`submit`] validates
//! input and hands back a [`QueryTicket`]; the host runs the ticket against a
//! [`QueryService`] (usually on a spawned task) and feeds the resulting
//! [`QueryCompletion`] back through [`complete`]. Every terminal outcome
//! appends exactly one assistant turn, so the session can never stay stuck
//! awaiting a response.
//!
//! [`submit`]: ConversationSession::submit
//! [`complete`]: ConversationSession::complete

use crate::config::Config;
use crate::service::{QueryService, ServiceError};
use crate::transcript::{Author, Transcript, Turn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Seeded assistant greeting.
pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Welcome to MOSDAC! How can I help you explore our satellite data archive?";

/// Assistant turn substituted when the query service fails.
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "Sorry, I couldn't fully process your question right now. Please try again in a moment.";

/// Result of [`ConversationSession::submit`].
#[must_use]
#[derive(Debug)]
pub enum Submission {
    /// The question was appended; run the ticket to get the answer.
    Sent(QueryTicket),
    /// Nothing but whitespace was submitted.
    Empty,
    /// A question is already in flight; the input was dropped.
    Busy,
}

impl Submission {
    /// The ticket, if the submission was accepted.
    pub fn ticket(self) -> Option<QueryTicket> {
        match self {
            Self::Sent(ticket) => Some(ticket),
            Self::Empty | Self::Busy => None,
        }
    }

    /// Whether the submission was accepted.
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// Handle for the one outstanding question of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    seq: u64,
    user_turn_id: u64,
    question: String,
}

impl QueryTicket {
    /// Sequence number tying this ticket to its session request.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Id of the user turn this ticket answers.
    pub fn user_turn_id(&self) -> u64 {
        self.user_turn_id
    }

    /// The question text to send.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Turn a service result into a completion for this ticket.
    pub fn complete_with(self, result: Result<String, ServiceError>) -> QueryCompletion {
        QueryCompletion {
            seq: self.seq,
            result,
        }
    }

    /// Completion for a request that was dropped before resolving.
    pub fn cancelled(self) -> QueryCompletion {
        self.complete_with(Err(ServiceError::Cancelled))
    }

    /// Ask `service` and wait at most `timeout` for the answer.
    ///
    /// Always yields a completion; an expired deadline becomes
    /// [`ServiceError::Timeout`].
    pub async fn run(self, service: &dyn QueryService, timeout: Duration) -> QueryCompletion {
        let result = match tokio::time::timeout(timeout, service.ask(&self.question)).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(timeout)),
        };
        self.complete_with(result)
    }
}

/// Terminal outcome of a [`QueryTicket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCompletion {
    seq: u64,
    result: Result<String, ServiceError>,
}

impl QueryCompletion {
    /// Sequence number of the ticket this completes.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The service result.
    pub fn result(&self) -> &Result<String, ServiceError> {
        &self.result
    }
}

/// Read-only copy of a session's observable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Turns in append order.
    pub turns: Vec<Turn>,
    /// Whether a question is awaiting its answer.
    pub awaiting_response: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingQuery {
    seq: u64,
    user_turn_id: u64,
}

/// Live, in-memory owner of a transcript and its pending-request state.
#[derive(Debug)]
pub struct ConversationSession {
    id: String,
    transcript: Transcript,
    pending: Option<PendingQuery>,
    next_seq: u64,
    revision: u64,
    fallback_message: String,
    last_failure: Option<ServiceError>,
}

impl ConversationSession {
    /// Create a session seeded with the default welcome turn.
    pub fn new() -> Self {
        Self::with_messages(DEFAULT_WELCOME_MESSAGE, DEFAULT_FALLBACK_MESSAGE)
    }

    /// Create a session with custom welcome and fallback texts.
    pub fn with_messages(welcome: impl Into<String>, fallback: impl Into<String>) -> Self {
        let mut transcript = Transcript::new();
        transcript.append(Author::Assistant, welcome);

        Self {
            id: Uuid::new_v4().to_string(),
            transcript,
            pending: None,
            next_seq: 1,
            revision: 1,
            fallback_message: fallback.into(),
            last_failure: None,
        }
    }

    /// Create a session using the messages from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_messages(&config.welcome_message, &config.fallback_message)
    }

    /// Unique session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Turns in append order.
    pub fn turns(&self) -> &[Turn] {
        self.transcript.turns()
    }

    /// Whether a question is in flight.
    pub fn awaiting_response(&self) -> bool {
        self.pending.is_some()
    }

    /// Counter bumped on every transcript mutation.
    ///
    /// Hosts compare it against the last value they rendered to know when to
    /// scroll to the newest turn.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Reason of the most recent failed request, cleared by the next success.
    pub fn last_failure(&self) -> Option<&ServiceError> {
        self.last_failure.as_ref()
    }

    /// Text used for fallback turns.
    pub fn fallback_message(&self) -> &str {
        &self.fallback_message
    }

    /// Submit a question.
    ///
    /// Whitespace-only input and input arriving while a question is in flight
    /// are dropped without touching the transcript. Otherwise the trimmed text
    /// is appended as a user turn and a ticket is returned.
    pub fn submit(&mut self, text: &str) -> Submission {
        let question = text.trim();
        if question.is_empty() {
            tracing::debug!(session = %self.id, "ignoring empty submission");
            return Submission::Empty;
        }
        if let Some(pending) = self.pending {
            tracing::debug!(
                session = %self.id,
                pending_seq = pending.seq,
                "ignoring submission while awaiting response"
            );
            return Submission::Busy;
        }

        let user_turn_id = self.transcript.append(Author::User, question).id;
        self.revision += 1;

        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending = Some(PendingQuery { seq, user_turn_id });

        tracing::info!(session = %self.id, seq, turn = user_turn_id, "question submitted");

        Submission::Sent(QueryTicket {
            seq,
            user_turn_id,
            question: question.to_string(),
        })
    }

    /// Apply the outcome of the outstanding ticket.
    ///
    /// Returns the appended assistant turn, or `None` when the completion does
    /// not belong to the outstanding request (it is discarded).
    pub fn complete(&mut self, completion: QueryCompletion) -> Option<&Turn> {
        let pending = match self.pending {
            Some(pending) if pending.seq == completion.seq => pending,
            _ => {
                tracing::warn!(
                    session = %self.id,
                    seq = completion.seq,
                    "discarding completion with no matching request"
                );
                return None;
            }
        };
        self.pending = None;

        let body = match completion.result {
            Ok(answer) => {
                tracing::info!(session = %self.id, seq = pending.seq, "answer received");
                self.last_failure = None;
                answer
            }
            Err(error) => {
                tracing::warn!(
                    session = %self.id,
                    seq = pending.seq,
                    turn = pending.user_turn_id,
                    %error,
                    "query failed, substituting fallback answer"
                );
                self.last_failure = Some(error);
                self.fallback_message.clone()
            }
        };

        self.revision += 1;
        Some(self.transcript.append(Author::Assistant, body))
    }

    /// Submit, run and complete a question in one call.
    ///
    /// Returns the assistant turn, or `None` if the submission was dropped.
    pub async fn ask(
        &mut self,
        text: &str,
        service: &dyn QueryService,
        timeout: Duration,
    ) -> Option<&Turn> {
        let ticket = self.submit(text).ticket()?;
        let completion = ticket.run(service, timeout).await;
        self.complete(completion)
    }

    /// Copy of the transcript and pending flag.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            turns: self.transcript.turns().to_vec(),
            awaiting_response: self.awaiting_response(),
        }
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}
