use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};

use p4triage::app::{handle_fatal_error, init_logging, AppConfig};
use p4triage::classify::{fetch_client_info, ClientInfo};
use p4triage::config::Settings;
use p4triage::console::display::format_client_info;
use p4triage::console::{Session, StdinPrompter};
use p4triage::storage::{BaselineStore, RecentFolders};
use p4triage::subprocess::{P4Runner, SubprocessManager};

/// Triage hijacked, modified, and unopened files in a Perforce workspace
#[derive(Parser)]
#[command(name = "p4triage", version)]
#[command(about = "Triage hijacked, modified, and unopened files in a Perforce workspace", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug and scan spinners, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::new(cli.verbose) {
        Ok(config) => config,
        Err(e) => handle_fatal_error(e, cli.verbose),
    };
    init_logging(&config);

    if let Err(e) = run(config).await {
        handle_fatal_error(e, cli.verbose);
    }
}

/// Make sure the session runs somewhere under the client root
fn enter_workspace(client: &mut ClientInfo) -> anyhow::Result<()> {
    if client.contains_current_dir() {
        return Ok(());
    }

    println!("⚠ WARNING: Not in workspace directory!");
    println!("  Current Dir:    {}", client.current_dir.display());
    println!("  Workspace Root: {}", client.client_root);
    println!("\nChanging to workspace root...");

    std::env::set_current_dir(&client.client_root)
        .with_context(|| format!("Could not change to workspace root {}", client.client_root))?;
    client.current_dir = std::env::current_dir()?;
    Ok(())
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let settings = Settings::load();
    debug!("Settings: {:?}", settings);

    let manager = SubprocessManager::production();
    let p4: Arc<dyn P4Runner> = Arc::new(manager.p4(&settings.p4_program));

    let mut client = fetch_client_info(p4.as_ref(), &config.working_dir).await?;
    enter_workspace(&mut client)?;
    println!("{}", format_client_info(&client));

    let recent = RecentFolders::open_default()?;
    let baseline = BaselineStore::open_default()?;
    info!("Connected to {} as {}", client.client_name, client.user_name);

    let mut session = Session::new(
        p4,
        Arc::new(StdinPrompter::new()),
        settings,
        client,
        recent,
        baseline,
    )
    .with_spinner(config.verbose_scan());

    session.run().await?;
    Ok(())
}
