use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use genui_core::{
    build_client, export, ClaudeClient, Config, Framework, GeminiClient, GenerationRequest,
    OllamaClient, OpenAIClient, Outcome, Provider, SessionController,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

const DEFAULT_LOG_FILTER: &str = "genui=info,genui_core=info";

#[derive(Parser)]
#[command(name = "genui")]
#[command(version, about = "Generate self-contained UI components with AI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a component once and print (or export) the code
    Generate {
        /// What the component should look like and do
        description: String,
        /// Target framework (see `genui frameworks`)
        #[arg(short, long)]
        framework: Option<String>,
        /// Provider to use (gemini, ollama, claude, openai)
        #[arg(short, long)]
        provider: Option<String>,
        /// Model to use instead of the provider's default
        #[arg(short, long)]
        model: Option<String>,
        /// Write GenUI-Code.html into this directory instead of printing
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List supported frameworks
    Frameworks,
    /// List models for a provider
    Models {
        /// Provider to list (defaults to the configured one)
        #[arg(short, long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("failed to load config")?;

    match cli.command {
        None => {
            init_file_logging()?;
            run_tui(config).await
        }
        Some(command) => {
            init_stderr_logging();
            match command {
                Commands::Generate {
                    description,
                    framework,
                    provider,
                    model,
                    out,
                } => {
                    generate_once(
                        &config,
                        &description,
                        framework.as_deref(),
                        provider.as_deref(),
                        model,
                        out.as_deref(),
                    )
                    .await
                }
                Commands::Frameworks => {
                    list_frameworks(&config);
                    Ok(())
                }
                Commands::Models { provider } => list_models(&config, provider.as_deref()).await,
            }
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// The TUI owns the terminal, so logs go to `<data_dir>/genui/genui.log`.
fn init_file_logging() -> Result<()> {
    let dir = dirs::data_dir()
        .ok_or_else(|| anyhow!("could not determine data directory"))?
        .join("genui");
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(dir.join("genui.log"))
        .context("failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

async fn run_tui(config: Config) -> Result<()> {
    let mut app = App::new(config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    tracing::info!(client = %app.session.client().describe(), "starting TUI");

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

fn parse_provider(name: Option<&str>, config: &Config) -> Result<Provider> {
    match name {
        Some(name) => Provider::from_str(name).ok_or_else(|| {
            anyhow!(
                "unknown provider '{}' (expected one of: {})",
                name,
                Provider::all()
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }),
        None => Ok(config.provider()),
    }
}

async fn generate_once(
    config: &Config,
    description: &str,
    framework: Option<&str>,
    provider: Option<&str>,
    model: Option<String>,
    out: Option<&Path>,
) -> Result<()> {
    let framework = match framework {
        Some(name) => Framework::from_str(name).ok_or_else(|| {
            anyhow!(
                "unknown framework '{}' (expected one of: {})",
                name,
                Framework::all()
                    .iter()
                    .map(|f| f.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })?,
        None => config.framework(),
    };
    let provider = parse_provider(provider, config)?;
    let model = model.unwrap_or_else(|| config.model_for(provider));

    let request = GenerationRequest::new(description, framework)?;
    let client = build_client(config, provider, &model)?;
    let mut session = SessionController::new(client);

    eprintln!(
        "Generating {} component with {}...",
        framework.display_name(),
        session.client().describe()
    );
    session.submit(request)?;

    match session.wait().await {
        Some(Outcome::Completed(_)) => {}
        Some(Outcome::Failed(reason)) => bail!("failed to generate code: {}", reason),
        other => bail!("generation ended without a result: {:?}", other),
    }

    let code = session
        .state()
        .code()
        .ok_or_else(|| anyhow!("no code available"))?;

    match out {
        Some(dir) => {
            let receipt = export::export_code(dir, code)?;
            eprintln!(
                "File downloaded successfully: {} ({} bytes, {})",
                receipt.path.display(),
                receipt.bytes,
                receipt.mime
            );
        }
        None => println!("{}", code),
    }

    Ok(())
}

fn list_frameworks(config: &Config) {
    let current = config.framework();
    for framework in Framework::all() {
        let marker = if framework == current { "*" } else { " " };
        println!("{} {:<24} {}", marker, framework.as_str(), framework.display_name());
    }
}

async fn list_models(config: &Config, provider: Option<&str>) -> Result<()> {
    let provider = parse_provider(provider, config)?;

    let models = match provider {
        Provider::Gemini => GeminiClient::list_models(),
        Provider::Claude => ClaudeClient::list_models(),
        Provider::OpenAI => OpenAIClient::list_models(),
        Provider::Ollama => {
            let client = OllamaClient::new(config.ollama_url(), config.timeout())?;
            match client.list_models().await {
                Ok(models) => models,
                Err(e) => {
                    eprintln!("Error connecting to Ollama: {}", e);
                    eprintln!("Make sure Ollama is running: ollama serve");
                    return Ok(());
                }
            }
        }
    };

    if models.is_empty() {
        println!("No models found for {}", provider.display_name());
        return Ok(());
    }

    let current = config.model_for(provider);
    for model in models {
        let marker = if model == current { "*" } else { " " };
        println!("{} {}", marker, model);
    }
    Ok(())
}
