//! Contracts for the external query-answering and graph-rendering services.
//!
//! The engine never talks to a transport directly; sessions and panels hand
//! out tickets and the host runs them against an implementation of
//! [`QueryService`] or [`GraphService`]. See [`crate::http`] for the HTTP
//! bindings and [`SimulatedQueryService`] / [`SimulatedGraphService`] for the
//! offline demo backends.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Canned answer returned by [`SimulatedQueryService`].
pub const SIMULATED_ANSWER: &str = "I'm processing your request about satellite data. \
This would connect to your backend for real responses.";

/// Locator returned by [`SimulatedGraphService`].
pub const SIMULATED_GRAPH_LOCATOR: &str = "/neo4j_graph.html";

/// Opaque reference to a rendered graph artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Where the artifact can be displayed from (URL or path).
    pub locator: String,
    /// Media type reported by the rendering service, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl ArtifactRef {
    /// Create a reference with no known content type.
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            content_type: None,
        }
    }

    /// Attach the content type reported by the service.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.locator)
    }
}

/// Answers questions about the archive.
#[async_trait::async_trait]
pub trait QueryService: Send + Sync {
    /// Return the answer text for `question`.
    async fn ask(&self, question: &str) -> Result<String, ServiceError>;
}

/// Produces the knowledge-graph artifact.
#[async_trait::async_trait]
pub trait GraphService: Send + Sync {
    /// Render (or locate) the graph artifact.
    async fn render(&self) -> Result<ArtifactRef, ServiceError>;
}

/// Terminal failure of a service request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The request never reached the service or the connection broke.
    #[error("{0}")]
    Network(String),

    /// No response within the deadline.
    #[error("timed out after {}", format_deadline(.0))]
    Timeout(Duration),

    /// The service answered with an error status.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP-like status code.
        status: u16,
        /// Message reported by the service.
        message: String,
    },

    /// The service answered but the payload could not be used.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request was dropped before producing an outcome.
    #[error("request cancelled")]
    Cancelled,
}

/// Whole seconds print as `30s`, anything finer in milliseconds.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn format_deadline(deadline: &Duration) -> String {
    if deadline.subsec_nanos() == 0 {
        format!("{}s", deadline.as_secs())
    } else {
        format!("{}ms", deadline.as_millis())
    }
}

/// Offline query service: every question gets the same canned answer after a
/// delay. Used by `--demo` and in tests.
#[derive(Debug, Clone)]
pub struct SimulatedQueryService {
    delay: Duration,
    answer: String,
}

impl SimulatedQueryService {
    /// Create a simulated service with the given response delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            answer: SIMULATED_ANSWER.to_string(),
        }
    }

    /// Override the canned answer.
    #[must_use]
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = answer.into();
        self
    }
}

impl Default for SimulatedQueryService {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait::async_trait]
impl QueryService for SimulatedQueryService {
    async fn ask(&self, question: &str) -> Result<String, ServiceError> {
        tracing::debug!(question_len = question.len(), "simulated query");
        tokio::time::sleep(self.delay).await;
        Ok(self.answer.clone())
    }
}

/// Offline graph service that hands out a fixed locator after a delay.
#[derive(Debug, Clone)]
pub struct SimulatedGraphService {
    delay: Duration,
    outcome: Result<ArtifactRef, ServiceError>,
}

impl SimulatedGraphService {
    /// Create a simulated service with the given response delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            outcome: Ok(ArtifactRef::new(SIMULATED_GRAPH_LOCATOR).with_content_type("text/html")),
        }
    }

    /// Make every render fail with `error`.
    #[must_use]
    pub fn failing(mut self, error: ServiceError) -> Self {
        self.outcome = Err(error);
        self
    }
}

impl Default for SimulatedGraphService {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[async_trait::async_trait]
impl GraphService for SimulatedGraphService {
    async fn render(&self) -> Result<ArtifactRef, ServiceError> {
        tokio::time::sleep(self.delay).await;
        self.outcome.clone()
    }
}
