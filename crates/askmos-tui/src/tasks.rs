//! Background work for the event loop.
//!
//! Questions and graph loads run as tokio tasks. The loop polls them with
//! [`Tasks::collect`] once per iteration and hands finished work back to
//! the [`App`]. A task that panics or is aborted resolves as cancelled so
//! the session and panel never stay stuck waiting.

use crate::app::{App, Command};
use askmos_engine::{
    Config, ConfigError, GraphService, HttpGraphService, HttpQueryService, LoadCompletion,
    LoadTicket, QueryCompletion, QueryService, QueryTicket, SimulatedGraphService,
    SimulatedQueryService,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The services the TUI talks to, with their deadlines.
#[derive(Clone)]
pub struct Services {
    pub query: Arc<dyn QueryService>,
    pub graph: Arc<dyn GraphService>,
    pub request_timeout: Duration,
    pub graph_timeout: Duration,
}

impl Services {
    /// Wrap the given services, taking deadlines from `config`.
    pub fn new(
        query: Arc<dyn QueryService>,
        graph: Arc<dyn GraphService>,
        config: &Config,
    ) -> Self {
        Self {
            query,
            graph,
            request_timeout: config.request_timeout(),
            graph_timeout: config.graph_timeout(),
        }
    }

    /// Services talking to the configured backend over HTTP.
    pub fn http(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            Arc::new(HttpQueryService::from_config(config)?),
            Arc::new(HttpGraphService::from_config(config)?),
            config,
        ))
    }

    /// Offline services with canned responses.
    pub fn simulated(config: &Config) -> Self {
        Self::new(
            Arc::new(SimulatedQueryService::default()),
            Arc::new(SimulatedGraphService::default()),
            config,
        )
    }
}

/// In-flight background work.
#[derive(Default)]
pub struct Tasks {
    queries: Vec<(QueryTicket, JoinHandle<QueryCompletion>)>,
    loads: Vec<(LoadTicket, JoinHandle<LoadCompletion>)>,
}

impl Tasks {
    /// Start the work a command asks for.
    pub fn dispatch(&mut self, command: Command, services: &Services) {
        match command {
            Command::Ask(ticket) => {
                let service = Arc::clone(&services.query);
                let timeout = services.request_timeout;
                let task_ticket = ticket.clone();
                let handle =
                    tokio::spawn(async move { task_ticket.run(service.as_ref(), timeout).await });
                self.queries.push((ticket, handle));
            }
            Command::LoadGraph(ticket) => {
                let service = Arc::clone(&services.graph);
                let timeout = services.graph_timeout;
                let task_ticket = ticket.clone();
                let handle =
                    tokio::spawn(async move { task_ticket.run(service.as_ref(), timeout).await });
                self.loads.push((ticket, handle));
            }
        }
    }

    /// Hand finished work to the app (non-blocking).
    pub async fn collect(&mut self, app: &mut App) {
        let mut i = 0;
        while i < self.queries.len() {
            if !self.queries[i].1.is_finished() {
                i += 1;
                continue;
            }
            let (ticket, handle) = self.queries.remove(i);
            let completion = match handle.await {
                Ok(completion) => completion,
                Err(e) => {
                    tracing::warn!(seq = ticket.seq(), error = %e, "query task failed");
                    ticket.cancelled()
                }
            };
            app.finish_query(completion);
        }

        let mut i = 0;
        while i < self.loads.len() {
            if !self.loads[i].1.is_finished() {
                i += 1;
                continue;
            }
            let (ticket, handle) = self.loads.remove(i);
            let completion = match handle.await {
                Ok(completion) => completion,
                Err(e) => {
                    tracing::warn!(seq = ticket.seq(), error = %e, "graph task failed");
                    ticket.cancelled()
                }
            };
            app.finish_graph(completion);
        }
    }

    /// Whether nothing is in flight.
    pub fn is_idle(&self) -> bool {
        self.queries.is_empty() && self.loads.is_empty()
    }

    /// Abort everything still running.
    pub fn abort_all(&mut self) {
        for (_, handle) in self.queries.drain(..) {
            handle.abort();
        }
        for (_, handle) in self.loads.drain(..) {
            handle.abort();
        }
    }
}
