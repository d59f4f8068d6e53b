mod display;
mod repl;
mod session;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use clarity_ai::{
    API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
    GatewayConfig, GeminiClient, InferenceGateway, MODEL_ENV,
};
use clarity_core::filter;
use tracing::Level;

use crate::session::Session;

#[derive(Parser)]
#[command(
    name = "clarity",
    version,
    about = "Clutter-to-Clarity: turn photos of storage spaces into a searchable inventory"
)]
struct Cli {
    #[command(flatten)]
    gateway: GatewayArgs,

    /// Log debug output to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args)]
struct GatewayArgs {
    /// Inference service API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long, env = MODEL_ENV, default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// Inference service base URL
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,
}

impl GatewayArgs {
    fn into_config(self) -> GatewayConfig {
        let mut config = GatewayConfig::from_env()
            .with_model(self.model)
            .with_base_url(self.base_url)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(key) = self.api_key {
            config = config.with_api_key(key);
        }
        config
    }
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive session (the default)
    Session,
    /// Analyze images once and print the resulting inventory
    Analyze {
        /// Images of storage spaces, one location each
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Only show items whose name or category contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Also suggest a bin label for every location
        #[arg(short, long)]
        label: bool,

        /// Print the inventory as JSON instead of cards
        #[arg(long, conflicts_with = "label")]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("clarity v{}", env!("CARGO_PKG_VERSION"));

    let client = GeminiClient::new(cli.gateway.into_config())?;
    let mut session = Session::new(client);

    match cli.command.unwrap_or(Command::Session) {
        Command::Session => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            repl::run(&mut session, stdin, &mut stdout).await?;
        }
        Command::Analyze {
            images,
            search,
            label,
            json,
        } => analyze_once(&mut session, &images, search, label, json).await?,
    }
    Ok(())
}

/// Analyze each image in order, then print the (optionally filtered) inventory.
async fn analyze_once<G: InferenceGateway>(
    session: &mut Session<G>,
    images: &[PathBuf],
    search: Option<String>,
    label: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut failures = 0usize;
    for image in images {
        let result = match session.select_image(image).await.map(|_| ()) {
            Ok(()) => session.analyze().await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            eprintln!("{}: {e}", image.display());
            session.clear_selection();
            failures += 1;
        }
    }
    if failures == images.len() {
        anyhow::bail!("no images could be analyzed");
    }

    if label {
        session.suggest_all_labels().await;
    }
    session.set_query(search.unwrap_or_default());

    let mut stdout = std::io::stdout().lock();
    if json {
        let filtered = filter(session.inventory().locations(), session.query());
        let text = serde_json::to_string_pretty(&filtered).context("serializing inventory")?;
        writeln!(stdout, "{text}")?;
    } else {
        display::render_inventory(&mut stdout, session)?;
    }
    Ok(())
}
