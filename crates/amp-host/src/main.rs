//! Terminal host for amp.
//!
//! Stands in for an editor: stdin lines play the part of editor events and
//! commands, stdout shows notifications and the status label, and the
//! endpoint is persisted in `<workspace>/.amp/settings.toml`.
//!
//!   cargo run -p amp-listener -- --port 8080
//!   cargo run -p amp-host -- --workspace . --endpoint ws://localhost:8080

mod console;
mod terminal;

use amp_client::{ClientConfig, FileSettings, Session, SettingsStore, WsDialer};
use amp_core::Endpoint;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "amp", about = "Broadcast live editor context over WebSocket")]
struct Args {
    /// Workspace directory; settings are stored under it.
    #[arg(long, env = "AMP_WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    /// Client config file (TOML). Missing file means defaults.
    #[arg(long, env = "AMP_CONFIG")]
    config: Option<PathBuf>,

    /// Store this endpoint before starting.
    #[arg(long, env = "AMP_ENDPOINT")]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("amp=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let workspace = args
        .workspace
        .canonicalize()
        .with_context(|| format!("workspace {} not found", args.workspace.display()))?;

    let config_path = args
        .config
        .unwrap_or_else(|| workspace.join(".amp").join("config.toml"));
    let config = ClientConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let mut settings = FileSettings::open(&workspace)?;
    if let Some(endpoint) = args.endpoint {
        settings.set_endpoint(&Endpoint::parse(&endpoint)?)?;
    }

    tracing::info!(
        workspace = %workspace.display(),
        settings = %settings.path().display(),
        "starting"
    );

    let editor = terminal::EditorView::for_workspace(&workspace);
    let answers = terminal::PendingAnswer::default();
    let (inputs_tx, inputs_rx) = mpsc::channel(32);
    let console = tokio::spawn(console::run(editor.clone(), answers.clone(), inputs_tx));

    let host = terminal::TerminalHost::new(settings, editor, answers);
    let session = Session::init(host, WsDialer, config).await;
    session.run(inputs_rx).await;

    console.abort();
    tracing::info!("stopped");
    Ok(())
}
