// Code commentary panel for the terminal
//
// Watches one file and prints a fresh AI commentary whenever it changes
// enough, using the same refresh orchestration an editor panel would.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use kodegen_code_commentary::{
    CommentaryError, CommentaryOptions, CommentaryPanel, CompletionClient, ConfigProvider,
    EnvConfigProvider, FsDocumentProvider, PersonaId, TerminalRenderer,
};

#[derive(Debug, Parser)]
#[command(name = "kodegen-code-commentary", version, about)]
struct Cli {
    /// File to comment on
    file: PathBuf,

    /// Persona id (cn-roaster, cn-praiser, en-roaster, en-praiser)
    #[arg(long)]
    persona: Option<String>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Seconds between automatic re-checks
    #[arg(long, default_value_t = 5)]
    interval_secs: u64,

    /// Largest file to send, in bytes
    #[arg(long, default_value_t = 100 * 1024)]
    max_file_size: u64,

    /// Changed lines that trigger an immediate re-query
    #[arg(long, default_value_t = 10)]
    min_line_changes: usize,

    /// Seconds before small edits trigger a re-query
    #[arg(long, default_value_t = 60)]
    min_interval_secs: u64,

    /// Only check that the endpoint and key work
    #[arg(long)]
    test_connection: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = Arc::new(EnvConfigProvider::from_env()?);
    if let Some(persona) = &cli.persona {
        config.set_persona(PersonaId::new(persona.as_str()))?;
    }

    let client = CompletionClient::new();

    if cli.test_connection {
        let credential = config
            .credential()
            .await
            .ok_or_else(|| CommentaryError::configuration("COMMENTARY_API_KEY is not set"))?;
        let endpoint = config
            .endpoint_config()
            .await
            .ok_or_else(|| CommentaryError::configuration("no endpoint configured"))?;
        let message = client
            .test_connection(&endpoint, &credential)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        println!("{message}");
        return Ok(());
    }

    let path = tokio::fs::canonicalize(&cli.file)
        .await
        .with_context(|| format!("cannot open {}", cli.file.display()))?;

    let options = CommentaryOptions::builder()
        .auto_refresh_interval(Duration::from_secs(cli.interval_secs))
        .max_file_size(cli.max_file_size)
        .min_line_changes(cli.min_line_changes)
        .min_requery_interval(Duration::from_secs(cli.min_interval_secs))
        .try_build()?;

    let panel = CommentaryPanel::new(
        Arc::new(FsDocumentProvider::new(path)),
        config,
        Arc::new(TerminalRenderer::new()),
        Arc::new(client.idle_timeout(options.stream_idle_timeout)),
        options,
    );

    let outcome = panel.set_visible(true).await;
    log::info!("Initial refresh: {outcome:?}");

    if !cli.once {
        tokio::signal::ctrl_c().await?;
    }

    panel.dispose();
    Ok(())
}
