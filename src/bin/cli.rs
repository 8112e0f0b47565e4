//! mcpilot CLI
//!
//! One-shot questions, an interactive chat session and configuration checks.

use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use mcpilot::config::{config_path, validate_config, Config, ConfigValidationResult};
use mcpilot::docker::ContainerGateway;
use mcpilot::runtime::{HealthStatus, Services};
use mcpilot::telemetry::init_tracing;
use mcpilot::{ConversationTurn, Error, Orchestrator, Result, VERSION};

#[derive(Parser)]
#[command(
    name = "mcpilot",
    author = "mcpilot Contributors",
    version = VERSION,
    about = "mcpilot - Gemini assistant for Docker MCP and workspace APIs",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the reply
    Ask {
        /// The question
        prompt: String,
    },

    /// Interactive chat mode
    Chat,

    /// Check the status of Docker and the model provider
    Status,

    /// Validate the configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.log)?;

    match cli.command {
        Some(Commands::Ask { prompt }) => ask(config, &prompt).await,
        Some(Commands::Chat) | None => interactive_chat(config).await,
        Some(Commands::Status) => check_status(config).await,
        Some(Commands::CheckConfig) => check_config(&config),
    }
}

// ============================================================================
// Chat
// ============================================================================

async fn orchestrator(config: Config) -> Result<Orchestrator> {
    let services = Services::start(config).await?;
    if !services.docker.is_healthy() {
        println!(
            "{} Docker is not reachable; container tools will report errors",
            style("⚠").yellow()
        );
    }
    services.orchestrator.ok_or_else(|| {
        Error::Config("GOOGLE_API_KEY is not configured. Add it to your .env file".to_string())
    })
}

async fn ask(config: Config, prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(Error::InvalidInput("prompt must not be empty".to_string()));
    }
    let orchestrator = orchestrator(config).await?;
    println!("{}", orchestrator.respond(prompt, &[]).await);
    Ok(())
}

async fn interactive_chat(config: Config) -> Result<()> {
    let orchestrator = orchestrator(config).await?;
    let theme = ColorfulTheme::default();
    let mut history: Vec<ConversationTurn> = Vec::new();

    println!("\n{}", style("mcpilot chat").cyan().bold());
    println!(
        "{}",
        style(format!(
            "  Model: {}  ·  /reset clears history  ·  /exit quits",
            orchestrator.active_model()
        ))
        .dim()
    );

    loop {
        let input: String = Input::with_theme(&theme)
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::InvalidInput(format!("Input error: {}", e)))?;

        let prompt = input.trim();
        match prompt {
            "" => continue,
            "/exit" | "/quit" => break,
            "/reset" => {
                history.clear();
                println!("{}", style("History cleared").dim());
                continue;
            }
            _ => {}
        }

        let reply = orchestrator.respond(prompt, &history).await;
        println!("\n{} {}\n", style("mcpilot:").green().bold(), reply);

        history.push(ConversationTurn::user(prompt).now());
        history.push(ConversationTurn::assistant(reply).now());
    }

    println!("{} Goodbye!", style("👋").bold());
    Ok(())
}

// ============================================================================
// Status and configuration
// ============================================================================

async fn check_status(config: Config) -> Result<()> {
    println!("\n{}", style("mcpilot status").cyan().bold());

    print_validation(&validate_config(&config));

    let services = Services::start(config).await?;
    let health = services.health();

    let mark = |ok: bool| if ok { style("✓").green() } else { style("✗").red() };
    println!("  {} Docker daemon", mark(health.docker_connected));
    println!("  {} Model provider", mark(health.llm_configured));
    println!("  Container: {} ({})", health.container_name, health.container_status);

    if let Some(orchestrator) = &services.orchestrator {
        println!("  Active model: {}", orchestrator.active_model());
        println!("  Fallbacks: {:?}", orchestrator.fallback().queued());
    }

    let overall = match health.status {
        HealthStatus::Healthy => style("healthy").green(),
        HealthStatus::Partial => style("partial").yellow(),
        HealthStatus::Unhealthy => style("unhealthy").red(),
    };
    println!("\n  Overall: {}\n", overall.bold());
    Ok(())
}

fn check_config(config: &Config) -> Result<()> {
    println!("Config file: {}", config_path().display());
    let result = validate_config(config);
    print_validation(&result);

    if result.valid {
        println!("{} Configuration is valid", style("✓").green());
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} configuration error(s)",
            result.errors.len()
        )))
    }
}

fn print_validation(result: &ConfigValidationResult) {
    for issue in &result.errors {
        println!("  {} {}", style("✗").red(), issue);
    }
    for issue in &result.warnings {
        println!("  {} {}", style("⚠").yellow(), issue);
    }
}
