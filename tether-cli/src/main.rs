// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tether: declarative plugin reconciler
//
//  One command, one Admin API operation:
//    create / read / update / delete / import a plugin attachment
//  State:   JSON state file (ids assigned by the gateway)
//  Config:  YAML file + TETHER_* env overrides
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tether_client::AdminClient;
use tether_cli::Session;
use tether_core::TetherConfig;
use tether_reconcile::PluginReconciler;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tether", version, about = "Tether, declarative gateway plugin reconciler")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "tether.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// State file path (overrides config)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Admin API base URL (overrides config)
    #[arg(long)]
    admin_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a declared plugin on the gateway
    Create {
        /// Resource name in the declaration file
        resource: String,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Refresh a stored plugin from the gateway
    Read { resource: String },
    /// Push declared changes of a stored plugin
    Update {
        resource: String,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a stored plugin from the gateway
    Delete { resource: String },
    /// Adopt an existing gateway plugin by id
    Import {
        resource: String,
        id: String,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print stored state
    Show { resource: Option<String> },
    /// Print the plugin attribute schema
    Schema,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    // ── Config ──
    let mut config = if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
        TetherConfig::load(&cli.config)?
    } else {
        tracing::debug!("No config file found, using defaults");
        TetherConfig::default()
    };
    if let Some(url) = cli.admin_url {
        config.admin.url = url;
    }
    if let Some(path) = cli.state_file {
        config.state.path = path;
    }

    // ── Reconciler ──
    let client = AdminClient::new(&config.admin)?;
    let session = Session::new(PluginReconciler::new(client), config.state.path.clone());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(run(&session, cli.command))
}

async fn run(session: &Session, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Create { resource, file } => {
            let d = session.create(&resource, &file).await?;
            print_json(&d)?;
        }
        Command::Read { resource } => match session.read(&resource).await? {
            Some(d) => print_json(&d)?,
            None => println!("\"{resource}\" no longer exists on the gateway"),
        },
        Command::Update { resource, file } => {
            let d = session.update(&resource, &file).await?;
            print_json(&d)?;
        }
        Command::Delete { resource } => {
            session.delete(&resource).await?;
            println!("\"{resource}\" deleted");
        }
        Command::Import { resource, id, file } => {
            let d = session.import(&resource, &id, file.as_deref()).await?;
            print_json(&d)?;
        }
        Command::Show { resource } => {
            print_json(&session.show(resource.as_deref())?)?;
        }
        Command::Schema => {
            for line in session.schema() {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
