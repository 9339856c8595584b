//! Knowledge-graph panel loader.
//!
//! Tracks the lifecycle of the single graph artifact a panel can show:
//!
//! ```text
//!            request_load            Ok(artifact)
//!   Idle ─────────────────▶ Loading ─────────────▶ Ready
//!    ▲                         │
//!    └─────── Err(reason) ─────┘   (Idle with error, retryable)
//! ```
//!
//! Requests are single-flight: triggering a load while one is outstanding is
//! ignored. A ready panel cannot be reloaded; hosts create a new panel
//! instead.

use crate::service::{ArtifactRef, GraphService, ServiceError};
use std::time::Duration;

/// Coarse status of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelStatus {
    /// No artifact and no request outstanding (possibly after a failure).
    #[default]
    Idle,
    /// A request is outstanding.
    Loading,
    /// The artifact is available.
    Ready,
}

impl std::fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PanelState {
    Idle { error: Option<String> },
    Loading { seq: u64 },
    Ready { artifact: ArtifactRef, rendered: bool },
}

/// Result of [`GraphPanel::request_load`].
#[must_use]
#[derive(Debug)]
pub enum LoadRequest {
    /// A request was started; run the ticket to resolve it.
    Started(LoadTicket),
    /// A request is already outstanding.
    AlreadyLoading,
    /// The artifact is already available.
    AlreadyReady,
}

impl LoadRequest {
    /// The ticket, if a request was started.
    pub fn ticket(self) -> Option<LoadTicket> {
        match self {
            Self::Started(ticket) => Some(ticket),
            Self::AlreadyLoading | Self::AlreadyReady => None,
        }
    }
}

/// Handle for the outstanding graph request of a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
}

impl LoadTicket {
    /// Sequence number tying this ticket to its panel request.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Turn a service result into a completion for this ticket.
    pub fn complete_with(self, result: Result<ArtifactRef, ServiceError>) -> LoadCompletion {
        LoadCompletion {
            seq: self.seq,
            result,
        }
    }

    /// Completion for a request that was dropped before resolving.
    pub fn cancelled(self) -> LoadCompletion {
        self.complete_with(Err(ServiceError::Cancelled))
    }

    /// Ask `service` for the artifact, waiting at most `timeout`.
    pub async fn run(self, service: &dyn GraphService, timeout: Duration) -> LoadCompletion {
        let result = match tokio::time::timeout(timeout, service.render()).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(timeout)),
        };
        self.complete_with(result)
    }
}

/// Terminal outcome of a [`LoadTicket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCompletion {
    seq: u64,
    result: Result<ArtifactRef, ServiceError>,
}

impl LoadCompletion {
    /// Sequence number of the ticket this completes.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The service result.
    pub fn result(&self) -> &Result<ArtifactRef, ServiceError> {
        &self.result
    }
}

/// State container for one knowledge-graph panel.
#[derive(Debug)]
pub struct GraphPanel {
    state: PanelState,
    next_seq: u64,
}

impl GraphPanel {
    /// Create an idle panel with no artifact.
    pub fn new() -> Self {
        Self {
            state: PanelState::Idle { error: None },
            next_seq: 1,
        }
    }

    /// Current coarse status.
    pub fn status(&self) -> PanelStatus {
        match self.state {
            PanelState::Idle { .. } => PanelStatus::Idle,
            PanelState::Loading { .. } => PanelStatus::Loading,
            PanelState::Ready { .. } => PanelStatus::Ready,
        }
    }

    /// Whether a request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.status() == PanelStatus::Loading
    }

    /// The artifact, present only when ready.
    pub fn artifact(&self) -> Option<&ArtifactRef> {
        match &self.state {
            PanelState::Ready { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    /// Failure reason of the last request, present only in idle.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            PanelState::Idle { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Whether the host has reported the ready artifact as rendered.
    pub fn is_rendered(&self) -> bool {
        matches!(self.state, PanelState::Ready { rendered: true, .. })
    }

    /// Start loading the artifact.
    ///
    /// Clears any previous error. Ignored while loading or once ready.
    pub fn request_load(&mut self) -> LoadRequest {
        match self.state {
            PanelState::Loading { seq } => {
                tracing::debug!(seq, "graph load already in flight");
                LoadRequest::AlreadyLoading
            }
            PanelState::Ready { .. } => {
                tracing::debug!("graph already loaded");
                LoadRequest::AlreadyReady
            }
            PanelState::Idle { .. } => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.state = PanelState::Loading { seq };
                tracing::info!(seq, "graph load requested");
                LoadRequest::Started(LoadTicket { seq })
            }
        }
    }

    /// Apply the outcome of the outstanding ticket.
    ///
    /// Returns `false` when the completion does not match the outstanding
    /// request; the panel is left untouched in that case.
    pub fn complete(&mut self, completion: LoadCompletion) -> bool {
        match self.state {
            PanelState::Loading { seq } if seq == completion.seq => {}
            _ => {
                tracing::warn!(seq = completion.seq, "discarding stale graph completion");
                return false;
            }
        }

        self.state = match completion.result {
            Ok(artifact) => {
                tracing::info!(seq = completion.seq, locator = %artifact, "graph ready");
                PanelState::Ready {
                    artifact,
                    rendered: false,
                }
            }
            Err(error) => {
                tracing::warn!(seq = completion.seq, %error, "graph load failed");
                PanelState::Idle {
                    error: Some(error.to_string()),
                }
            }
        };
        true
    }

    /// Host signal that `artifact` finished rendering.
    ///
    /// Guarantees the panel is not reporting `Loading` for a displayed
    /// artifact. Signals for anything other than the ready artifact are
    /// ignored. Returns whether the signal was applied.
    pub fn artifact_rendered(&mut self, rendered_artifact: &ArtifactRef) -> bool {
        let status = self.status();
        match &mut self.state {
            PanelState::Ready { artifact, rendered } if *artifact == *rendered_artifact => {
                *rendered = true;
                true
            }
            _ => {
                tracing::debug!(locator = %rendered_artifact, %status, "ignoring render signal");
                false
            }
        }
    }

    /// Request, run and complete a load in one call.
    ///
    /// Returns `None` when no request was started.
    pub async fn load(
        &mut self,
        service: &dyn GraphService,
        timeout: Duration,
    ) -> Option<PanelStatus> {
        let ticket = self.request_load().ticket()?;
        let completion = ticket.run(service, timeout).await;
        self.complete(completion);
        Some(self.status())
    }
}

impl Default for GraphPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::SimulatedGraphService;

    fn graph() -> ArtifactRef {
        ArtifactRef::new("http://127.0.0.1:5000/neo4j_graph.html")
    }

    #[test]
    fn test_new_panel_is_idle() {
        let panel = GraphPanel::new();
        assert_eq!(panel.status(), PanelStatus::Idle);
        assert!(panel.artifact().is_none());
        assert!(panel.error().is_none());
    }

    #[test]
    fn test_successful_load() {
        let mut panel = GraphPanel::new();
        let ticket = panel.request_load().ticket().unwrap();
        assert_eq!(panel.status(), PanelStatus::Loading);

        assert!(panel.complete(ticket.complete_with(Ok(graph()))));
        assert_eq!(panel.status(), PanelStatus::Ready);
        assert_eq!(panel.artifact(), Some(&graph()));
        assert!(panel.error().is_none());
    }

    #[test]
    fn test_failure_then_retry() {
        let mut panel = GraphPanel::new();
        let ticket = panel.request_load().ticket().unwrap();
        assert_eq!(panel.status(), PanelStatus::Loading);

        panel.complete(ticket.complete_with(Err(ServiceError::Network("unreachable".into()))));
        assert_eq!(panel.status(), PanelStatus::Idle);
        assert_eq!(panel.error(), Some("unreachable"));
        assert!(panel.artifact().is_none());

        let retry = panel.request_load().ticket().unwrap();
        assert_eq!(panel.status(), PanelStatus::Loading);
        assert!(panel.error().is_none());

        panel.complete(retry.complete_with(Ok(graph())));
        assert_eq!(panel.status(), PanelStatus::Ready);
    }

    #[test]
    fn test_double_request_is_single_flight() {
        let mut panel = GraphPanel::new();
        let first = panel.request_load();
        let second = panel.request_load();

        assert!(matches!(second, LoadRequest::AlreadyLoading));
        let ticket = first.ticket().unwrap();

        assert!(panel.complete(ticket.clone().complete_with(Ok(graph()))));
        // A duplicate resolution for the same ticket changes nothing.
        assert!(!panel.complete(ticket.complete_with(Ok(ArtifactRef::new("/other.html")))));
        assert_eq!(panel.artifact(), Some(&graph()));
    }

    #[test]
    fn test_ready_panel_cannot_reload() {
        let mut panel = GraphPanel::new();
        let ticket = panel.request_load().ticket().unwrap();
        panel.complete(ticket.complete_with(Ok(graph())));

        assert!(matches!(panel.request_load(), LoadRequest::AlreadyReady));
        assert_eq!(panel.status(), PanelStatus::Ready);
    }

    #[test]
    fn test_stale_completion_after_failure_is_ignored() {
        let mut panel = GraphPanel::new();
        let first = panel.request_load().ticket().unwrap();
        let stale = first.clone();
        panel.complete(first.complete_with(Err(ServiceError::Cancelled)));

        let _second = panel.request_load().ticket().unwrap();
        assert!(!panel.complete(stale.complete_with(Ok(graph()))));
        assert_eq!(panel.status(), PanelStatus::Loading);
    }

    #[test]
    fn test_artifact_rendered_signal() {
        let mut panel = GraphPanel::new();
        assert!(!panel.artifact_rendered(&graph()));

        let ticket = panel.request_load().ticket().unwrap();
        assert!(!panel.artifact_rendered(&graph()));
        assert!(panel.is_loading());

        panel.complete(ticket.complete_with(Ok(graph())));
        assert!(!panel.is_rendered());
        assert!(!panel.artifact_rendered(&ArtifactRef::new("/elsewhere.html")));
        assert!(panel.artifact_rendered(&graph()));
        assert!(panel.is_rendered());
        assert!(!panel.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_with_simulated_service() {
        let mut panel = GraphPanel::new();
        let status = panel
            .load(&SimulatedGraphService::default(), Duration::from_secs(30))
            .await;

        assert_eq!(status, Some(PanelStatus::Ready));
        assert_eq!(
            panel.artifact().map(|a| a.locator.as_str()),
            Some(crate::service::SIMULATED_GRAPH_LOCATOR)
        );
        assert!(panel
            .load(&SimulatedGraphService::default(), Duration::from_secs(30))
            .await
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_times_out() {
        let slow = SimulatedGraphService::new(Duration::from_secs(120));
        let mut panel = GraphPanel::new();

        let status = panel.load(&slow, Duration::from_secs(30)).await;

        assert_eq!(status, Some(PanelStatus::Idle));
        assert_eq!(panel.error(), Some("timed out after 30s"));
    }
}
