//! askmos CLI: Command-line interface for the satellite data assistant

use askmos_engine::{
    ArtifactRef, Config, ConfigError, ConversationSession, GraphPanel, PanelStatus, Turn,
};
use askmos_tui::Services;
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Ask questions about the MOSDAC satellite data archive
#[derive(Parser)]
#[command(name = "askmos")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file
    #[arg(long, global = true, default_value = ".askmos/config.json")]
    config: PathBuf,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "ASKMOS_BACKEND_URL")]
    backend: Option<String>,

    /// Use offline canned responses instead of the backend
    #[arg(long, global = true)]
    demo: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Ask a single question and print the answer
    Ask {
        /// The question
        question: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load the knowledge graph and print where it lives
    Graph {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create .askmos/ and a default config
    Init,

    /// Print the effective configuration
    Config,
}

const ASKMOS_DIR: &str = ".askmos";
const LOG_FILE: &str = "askmos.log";
const LOG_ENV: &str = "ASKMOS_LOG";

fn main() {
    let cli = Cli::parse();
    let tui_mode = matches!(cli.command, None | Some(Commands::Tui));
    init_logging(tui_mode);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };

    tracing::debug!(
        config = %cli.config.display(),
        backend = %config.backend_url,
        demo = cli.demo,
        "starting"
    );

    match &cli.command {
        None | Some(Commands::Tui) => cmd_tui(&cli, &config),
        Some(Commands::Ask { question, json }) => cmd_ask(&cli, &config, question, *json),
        Some(Commands::Graph { json }) => cmd_graph(&cli, &config, *json),
        Some(Commands::Init) => cmd_init(&cli.config),
        Some(Commands::Config) => cmd_config(&config),
    }
}

/// Install the tracing subscriber. The TUI owns the terminal, so its logs
/// go to a file.
fn init_logging(to_file: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    if !to_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return;
    }

    let path = Path::new(ASKMOS_DIR).join(LOG_FILE);
    let file = std::fs::create_dir_all(ASKMOS_DIR)
        .and_then(|()| OpenOptions::new().create(true).append(true).open(&path));
    match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init(),
        // Without a log file the TUI runs silently.
        Err(e) => eprintln!("Logging disabled, cannot open {}: {e}", path.display()),
    }
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(backend) = &cli.backend {
        config.backend_url.clone_from(backend);
    }
    Ok(config)
}

fn services(cli: &Cli, config: &Config) -> Services {
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }
    if cli.demo {
        return Services::simulated(config);
    }
    match Services::http(config) {
        Ok(services) => services,
        Err(e) => {
            eprintln!("Invalid backend configuration: {e}");
            std::process::exit(1);
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_tui(cli: &Cli, config: &Config) {
    let services = services(cli, config);
    let label = if cli.demo {
        "demo mode".to_string()
    } else {
        config.backend_url.clone()
    };

    let rt = runtime();
    if let Err(e) = rt.block_on(askmos_tui::run_tui(config, services, &label)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Result of a one-shot question.
#[derive(Debug)]
struct AskReport {
    session: String,
    turns: Vec<Turn>,
    /// Assistant reply; `None` when nothing was asked.
    answer: Option<String>,
    error: Option<String>,
}

impl AskReport {
    /// 0 on an answer, 1 after a fallback reply, 2 for an empty question.
    fn exit_code(&self) -> i32 {
        match (&self.answer, &self.error) {
            (None, _) => 2,
            (Some(_), Some(_)) => 1,
            (Some(_), None) => 0,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "session": self.session,
            "turns": self.turns,
            "answer": self.answer,
            "error": self.error,
        })
    }
}

async fn run_ask(config: &Config, services: &Services, question: &str) -> AskReport {
    let mut session = ConversationSession::from_config(config);
    let answer = session
        .ask(question, services.query.as_ref(), services.request_timeout)
        .await
        .map(|turn| turn.body.clone());
    AskReport {
        session: session.id().to_string(),
        turns: session.snapshot().turns,
        error: session.last_failure().map(ToString::to_string),
        answer,
    }
}

fn cmd_ask(cli: &Cli, config: &Config, question: &str, json: bool) {
    let services = services(cli, config);
    let report = runtime().block_on(run_ask(config, &services, question));

    if json {
        print_json(&report.to_json());
    } else if let Some(answer) = &report.answer {
        println!("{answer}");
    }

    match (&report.answer, &report.error) {
        (None, _) => eprintln!("Nothing to ask: the question is empty"),
        (Some(_), Some(error)) => eprintln!("Query failed: {error}"),
        (Some(_), None) => {}
    }
    exit_with(report.exit_code());
}

/// Result of a one-shot graph load.
#[derive(Debug)]
struct GraphReport {
    status: Option<PanelStatus>,
    artifact: Option<ArtifactRef>,
    error: Option<String>,
}

impl GraphReport {
    /// 0 when the graph is ready, 1 otherwise.
    fn exit_code(&self) -> i32 {
        i32::from(self.status != Some(PanelStatus::Ready))
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": self.status.map(|s| s.to_string()),
            "artifact": self.artifact,
            "error": self.error,
        })
    }
}

async fn run_graph(services: &Services) -> GraphReport {
    let mut panel = GraphPanel::new();
    let status = panel
        .load(services.graph.as_ref(), services.graph_timeout)
        .await;
    GraphReport {
        status,
        artifact: panel.artifact().cloned(),
        error: panel.error().map(str::to_string),
    }
}

fn cmd_graph(cli: &Cli, config: &Config, json: bool) {
    let services = services(cli, config);
    let report = runtime().block_on(run_graph(&services));

    if json {
        print_json(&report.to_json());
    } else if let Some(artifact) = &report.artifact {
        println!("{}", artifact.locator);
        if let Some(content_type) = &artifact.content_type {
            println!("Content-Type: {content_type}");
        }
    }

    if report.exit_code() != 0 {
        eprintln!(
            "Knowledge graph unavailable: {}",
            report.error.as_deref().unwrap_or("no request was made")
        );
    }
    exit_with(report.exit_code());
}

fn exit_with(code: i32) {
    if code != 0 {
        std::process::exit(code);
    }
}

fn cmd_init(config_path: &Path) {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return;
    }

    match Config::default().save(config_path) {
        Ok(()) => println!("Created {}", config_path.display()),
        Err(e) => {
            eprintln!("Failed to write config: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_config(config: &Config) {
    print_json(config);
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Failed to serialize output: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askmos_engine::{ServiceError, SimulatedGraphService, SimulatedQueryService};
    use std::sync::Arc;
    use std::time::Duration;

    fn simulated(
        config: &Config,
        query: SimulatedQueryService,
        graph: SimulatedGraphService,
    ) -> Services {
        Services::new(Arc::new(query), Arc::new(graph), config)
    }

    fn instant_services(config: &Config) -> Services {
        simulated(
            config,
            SimulatedQueryService::new(Duration::ZERO)
                .with_answer("MOSDAC is a satellite data archive."),
            SimulatedGraphService::new(Duration::ZERO),
        )
    }

    #[tokio::test]
    async fn test_ask_success_exits_zero() {
        let config = Config::default();
        let report = run_ask(&config, &instant_services(&config), "What is MOSDAC?").await;

        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.answer.as_deref(), Some("MOSDAC is a satellite data archive."));

        let json = report.to_json();
        assert_eq!(json["answer"], "MOSDAC is a satellite data archive.");
        assert!(json["error"].is_null());
        assert_eq!(json["turns"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["turns"][1]["author"], "user");
        assert_eq!(json["turns"][1]["body"], "What is MOSDAC?");
        assert!(json["session"].is_string());
    }

    #[tokio::test]
    async fn test_ask_empty_question_exits_two() {
        let config = Config::default();
        let report = run_ask(&config, &instant_services(&config), "   ").await;

        assert_eq!(report.exit_code(), 2);
        assert!(report.answer.is_none());
        assert_eq!(report.to_json()["turns"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ask_timeout_prints_fallback_and_exits_one() {
        let config = Config {
            request_timeout_seconds: 1,
            ..Config::default()
        };
        let services = simulated(
            &config,
            SimulatedQueryService::new(Duration::from_secs(3600)),
            SimulatedGraphService::new(Duration::ZERO),
        );
        let report = run_ask(&config, &services, "Show rainfall").await;

        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.answer.as_deref(), Some(config.fallback_message.as_str()));
        assert_eq!(report.error.as_deref(), Some("timed out after 1s"));
    }

    #[tokio::test]
    async fn test_graph_ready_exits_zero() {
        let config = Config::default();
        let report = run_graph(&instant_services(&config)).await;

        assert_eq!(report.exit_code(), 0);
        let json = report.to_json();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["artifact"]["locator"], "/neo4j_graph.html");
        assert!(json["error"].is_null());
    }

    #[tokio::test]
    async fn test_graph_failure_exits_one() {
        let config = Config::default();
        let services = simulated(
            &config,
            SimulatedQueryService::new(Duration::ZERO),
            SimulatedGraphService::new(Duration::ZERO)
                .failing(ServiceError::Network("unreachable".into())),
        );
        let report = run_graph(&services).await;

        assert_eq!(report.exit_code(), 1);
        let json = report.to_json();
        assert_eq!(json["status"], "idle");
        assert!(json["artifact"].is_null());
        assert_eq!(json["error"], "unreachable");
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_tui() {
        let cli = Cli::try_parse_from(["askmos"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(".askmos/config.json"));
        assert!(!cli.demo);
    }

    #[test]
    fn test_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "askmos",
            "ask",
            "What is MOSDAC?",
            "--json",
            "--demo",
            "--backend",
            "http://10.0.0.2:5000",
        ])
        .unwrap();

        assert!(cli.demo);
        assert_eq!(cli.backend.as_deref(), Some("http://10.0.0.2:5000"));
        match cli.command {
            Some(Commands::Ask { question, json }) => {
                assert_eq!(question, "What is MOSDAC?");
                assert!(json);
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn test_backend_flag_overrides_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        Config::default().save(&path).unwrap();

        let cli = Cli::try_parse_from([
            "askmos",
            "--config",
            path.to_str().unwrap(),
            "--backend",
            "http://archive.example",
            "config",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();
        assert_eq!(config.backend_url, "http://archive.example");
        assert_eq!(config.ask_url().unwrap().as_str(), "http://archive.example/ask");
    }
}
