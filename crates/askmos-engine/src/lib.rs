//! askmos-engine: Headless engine for the askmos satellite data assistant
//!
//! This crate provides the client-side interaction state for askmos:
//! - Append-only conversation transcript and the single-flight session
//! - Knowledge-graph panel loader (idle → loading → ready / failed)
//! - Contracts for the query-answering and graph-rendering services
//! - HTTP and simulated service implementations
//! - Configuration

pub mod config;
pub mod http;
pub mod panel;
pub mod service;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use http::{HttpGraphService, HttpQueryService};
pub use panel::{GraphPanel, LoadCompletion, LoadRequest, LoadTicket, PanelStatus};
pub use service::{
    ArtifactRef, GraphService, QueryService, ServiceError, SimulatedGraphService,
    SimulatedQueryService,
};
pub use session::{
    ConversationSession, QueryCompletion, QueryTicket, SessionSnapshot, Submission,
    DEFAULT_FALLBACK_MESSAGE, DEFAULT_WELCOME_MESSAGE,
};
pub use transcript::{Author, Transcript, Turn};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[test]
    fn test_session_and_panel_are_independent() {
        let mut session = ConversationSession::new();
        let mut panel = GraphPanel::new();

        let load = panel.request_load().ticket().unwrap();
        panel.complete(load.complete_with(Err(ServiceError::Network("unreachable".into()))));

        assert_eq!(panel.error(), Some("unreachable"));
        assert_eq!(session.turns().len(), 1);
        assert!(session.last_failure().is_none());

        let query = session.submit("What is MOSDAC?").ticket().unwrap();
        session.complete(query.cancelled());
        assert_eq!(panel.status(), PanelStatus::Idle);
        assert_eq!(panel.error(), Some("unreachable"));
    }
}
