//! HTTP bindings for the archive backend.
//!
//! The backend exposes `POST /ask` taking `{"query": "..."}` and answering
//! `{"answer": "..."}` (or `{"error": "..."}` with a 4xx/5xx status), and
//! serves the rendered knowledge graph as a static HTML document.

use crate::config::{Config, ConfigError};
use crate::service::{ArtifactRef, GraphService, QueryService, ServiceError};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct AskRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Query service backed by the `/ask` endpoint.
#[derive(Debug, Clone)]
pub struct HttpQueryService {
    client: Client,
    url: Url,
}

impl HttpQueryService {
    /// Create a service posting questions to `url`.
    pub fn new(url: Url) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Create a service sharing an existing client.
    pub fn with_client(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    /// Create a service for the endpoint named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.ask_url()?))
    }

    /// Endpoint questions are posted to.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait::async_trait]
impl QueryService for HttpQueryService {
    async fn ask(&self, question: &str) -> Result<String, ServiceError> {
        tracing::debug!(url = %self.url, "posting question");

        let response = self
            .client
            .post(self.url.clone())
            .json(&AskRequest { query: question })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(server_error(status, response).await);
        }

        let body: AskResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        match (body.answer, body.error) {
            (Some(answer), _) => Ok(answer),
            (None, Some(message)) => Err(ServiceError::Server {
                status: status.as_u16(),
                message,
            }),
            (None, None) => Err(ServiceError::InvalidResponse(
                "response has no answer".into(),
            )),
        }
    }
}

/// Graph service backed by the static graph document.
#[derive(Debug, Clone)]
pub struct HttpGraphService {
    client: Client,
    url: Url,
}

impl HttpGraphService {
    /// Create a service fetching the graph from `url`.
    pub fn new(url: Url) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Create a service sharing an existing client.
    pub fn with_client(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    /// Create a service for the document named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.graph_url()?))
    }

    /// Location of the graph document.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait::async_trait]
impl GraphService for HttpGraphService {
    async fn render(&self) -> Result<ArtifactRef, ServiceError> {
        tracing::debug!(url = %self.url, "fetching graph document");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(server_error(status, response).await);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let document = response.bytes().await.map_err(transport_error)?;
        if document.is_empty() {
            return Err(ServiceError::InvalidResponse("graph document is empty".into()));
        }

        let artifact = ArtifactRef::new(self.url.as_str());
        Ok(match content_type {
            Some(content_type) => artifact.with_content_type(content_type),
            None => artifact,
        })
    }
}

fn transport_error(error: reqwest::Error) -> ServiceError {
    if error.is_decode() {
        ServiceError::InvalidResponse(error.to_string())
    } else {
        ServiceError::Network(error.to_string())
    }
}

/// Build a server error, preferring the backend's `error` field as message.
async fn server_error(status: StatusCode, response: Response) -> ServiceError {
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<AskResponse>(&text)
        .ok()
        .and_then(|body| body.error)
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

    ServiceError::Server {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn config_for(base: &str) -> Config {
        Config {
            backend_url: base.to_string(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_ask_returns_answer() {
        let app = Router::new().route(
            "/ask",
            post(|Json(body): Json<Value>| async move {
                let query = body["query"].as_str().unwrap_or_default().to_string();
                Json(json!({ "answer": format!("You asked: {query}") }))
            }),
        );
        let base = serve(app).await;
        let service = HttpQueryService::from_config(&config_for(&base)).unwrap();

        let answer = service.ask("What is MOSDAC?").await.unwrap();
        assert_eq!(answer, "You asked: What is MOSDAC?");
    }

    #[tokio::test]
    async fn test_ask_surfaces_backend_error() {
        let app = Router::new().route(
            "/ask",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Error processing query: neo4j down" })),
                )
            }),
        );
        let base = serve(app).await;
        let service = HttpQueryService::from_config(&config_for(&base)).unwrap();

        let err = service.ask("What is MOSDAC?").await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Server {
                status: 500,
                message: "Error processing query: neo4j down".into()
            }
        );
    }

    #[tokio::test]
    async fn test_ask_rejects_body_without_answer() {
        let app = Router::new().route("/ask", post(|| async { Json(json!({ "debug": {} })) }));
        let base = serve(app).await;
        let service = HttpQueryService::from_config(&config_for(&base)).unwrap();

        assert!(matches!(
            service.ask("q").await,
            Err(ServiceError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_ask_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = format!("http://{addr}");
        let service = HttpQueryService::from_config(&config_for(&base)).unwrap();
        assert!(matches!(
            service.ask("q").await,
            Err(ServiceError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_graph_document_becomes_artifact() {
        let app = Router::new().route(
            "/neo4j_graph.html",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                    "<html><body>graph</body></html>",
                )
            }),
        );
        let base = serve(app).await;
        let service = HttpGraphService::from_config(&config_for(&base)).unwrap();

        let artifact = service.render().await.unwrap();
        assert_eq!(artifact.locator, format!("{base}/neo4j_graph.html"));
        assert_eq!(
            artifact.content_type.as_deref(),
            Some("text/html; charset=utf-8")
        );
    }

    #[tokio::test]
    async fn test_missing_graph_is_server_error() {
        let base = serve(Router::new()).await;
        let service = HttpGraphService::from_config(&config_for(&base)).unwrap();

        assert!(matches!(
            service.render().await,
            Err(ServiceError::Server { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_graph_is_invalid() {
        let app = Router::new().route("/neo4j_graph.html", get(|| async { "" }));
        let base = serve(app).await;
        let service = HttpGraphService::from_config(&config_for(&base)).unwrap();

        assert!(matches!(
            service.render().await,
            Err(ServiceError::InvalidResponse(_))
        ));
    }
}
