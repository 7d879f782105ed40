//! Massa Warden CLI
//!
//! Single binary for running a Massa node on a remote server:
//! - One-shot commands (setup, status, start, logs, wallet, ...) over SSH
//! - `serve`, the local IPC daemon a graphical front end talks to

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use massa_warden::commands::{self, ConnectionArgs};
use massa_warden::daemon::DaemonClient;
use massa_warden::output::{print_info, print_success, print_warning};
use mw_core::config::{self, WardenConfig};
use mw_core::ClientCommand;
use mw_remote::SshNodeManager;

#[derive(Parser)]
#[command(name = "massa-warden")]
#[command(author, version, about = "Install, run and stake a Massa node over SSH")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the local IPC daemon for a front end
    Serve {
        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Stop a running daemon
    Stop,

    /// Run a shell command on the server
    Exec {
        /// Command and arguments, joined with spaces
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Install the node if needed, then start node and client
    Setup {
        /// Public IP announced by the node
        #[arg(long)]
        public_ip: String,
        /// Remove any existing install first
        #[arg(short, long)]
        force: bool,
    },

    /// Check whether the node is installed
    Installed,

    /// Show the node status
    Status,

    /// Start an installed node
    Start,

    /// Show the latest node screen output
    Logs,

    /// Show server resource usage
    Stats,

    /// Manage the node wallet
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },

    /// Buy or sell rolls
    Rolls {
        #[command(subcommand)]
        action: RollsAction,
    },

    /// Start staking with an address
    Stake {
        /// Wallet address
        address: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Commands {
    /// Whether the command hands the node password to the server
    fn needs_node_password(&self) -> bool {
        matches!(
            self,
            Commands::Setup { .. }
                | Commands::Start
                | Commands::Wallet { .. }
                | Commands::Rolls { .. }
                | Commands::Stake { .. }
        )
    }
}

#[derive(Subcommand)]
enum WalletAction {
    /// Show wallet addresses and balances
    Info,
    /// Generate a new secret key
    Generate,
    /// Import a secret key
    Import { secret_key: String },
    /// Show the public key of an address
    PublicKey { address: String },
}

#[derive(Subcommand)]
enum RollsAction {
    /// Buy rolls
    Buy {
        address: String,
        count: u64,
        /// Operation fee in MAS
        #[arg(long, default_value_t = 0.01)]
        fee: f64,
    },
    /// Sell rolls
    Sell {
        address: String,
        count: u64,
        /// Operation fee in MAS
        #[arg(long, default_value_t = 0.01)]
        fee: f64,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show config file path
    Path,
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let command = match cli.command {
        Commands::Config { action } => {
            let path = cli.config.as_deref();
            return match action {
                ConfigAction::Show => commands::config_show(path),
                ConfigAction::Path => commands::config_path(path),
                ConfigAction::Init { force } => commands::config_init(path, force),
            };
        }
        Commands::Stop => return stop_daemon(cli.config.as_ref()).await,
        other => other,
    };

    let config = config::load_or_default(cli.config.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    if let Commands::Serve { bind } = command {
        return run_daemon(config, bind).await;
    }

    // Validate local arguments before dialing
    let client_command = client_command_for(&command);
    if let Some(client_command) = &client_command {
        client_command.validate()?;
    }
    if command.needs_node_password() {
        cli.connection.require_node_password()?;
    }

    let mut manager = commands::open_session(&cli.connection, &config).await?;
    let result = run_remote(&mut manager, &cli.connection, command, client_command).await;
    commands::close_session(&mut manager).await;
    result
}

/// Run one operation on an open session
async fn run_remote(
    manager: &mut SshNodeManager,
    connection: &ConnectionArgs,
    command: Commands,
    client_command: Option<ClientCommand>,
) -> Result<()> {
    if let Some(client_command) = client_command {
        let node_password = connection.require_node_password()?;
        return commands::client_command(manager, node_password, &client_command).await;
    }

    match command {
        Commands::Exec { command } => commands::exec_command(manager, &command.join(" ")).await,
        Commands::Setup { public_ip, force } => {
            let node_password = connection.require_node_password()?;
            commands::setup_command(manager, node_password, &public_ip, force).await
        }
        Commands::Installed => commands::installed_command(manager).await.map(|_| ()),
        Commands::Status => commands::status_command(manager).await.map(|_| ()),
        Commands::Start => {
            let node_password = connection.require_node_password()?;
            commands::start_command(manager, node_password).await
        }
        Commands::Logs => commands::logs_command(manager).await,
        Commands::Stats => commands::stats_command(manager).await,
        Commands::Serve { .. }
        | Commands::Stop
        | Commands::Config { .. }
        | Commands::Wallet { .. }
        | Commands::Rolls { .. }
        | Commands::Stake { .. } => anyhow::bail!("Command does not run over SSH"),
    }
}

/// massa-client command for wallet, rolls and stake subcommands
fn client_command_for(command: &Commands) -> Option<ClientCommand> {
    let client_command = match command {
        Commands::Wallet { action } => match action {
            WalletAction::Info => ClientCommand::WalletInfo,
            WalletAction::Generate => ClientCommand::WalletGenerateSecretKey,
            WalletAction::Import { secret_key } => ClientCommand::WalletAddSecretKeys {
                secret_key: secret_key.clone(),
            },
            WalletAction::PublicKey { address } => ClientCommand::WalletGetPublicKey {
                address: address.clone(),
            },
        },
        Commands::Rolls { action } => match action {
            RollsAction::Buy { address, count, fee } => ClientCommand::BuyRolls {
                address: address.clone(),
                roll_count: *count,
                fee: *fee,
            },
            RollsAction::Sell { address, count, fee } => ClientCommand::SellRolls {
                address: address.clone(),
                roll_count: *count,
                fee: *fee,
            },
        },
        Commands::Stake { address } => ClientCommand::NodeStartStaking {
            address: address.clone(),
        },
        _ => return None,
    };
    Some(client_command)
}

// ============================================================================
// Daemon
// ============================================================================

async fn run_daemon(config: WardenConfig, bind_override: Option<String>) -> Result<()> {
    use mw_daemon::ipc::IpcServer;
    use mw_daemon::DaemonState;
    use mw_remote::{NodeManager, SshConnector};

    tracing::info!("Massa Warden daemon starting...");

    let bind_addr = bind_override.unwrap_or_else(|| config.ipc_address());
    let manager = NodeManager::new(SshConnector::from_config(&config), config);
    let state = Arc::new(DaemonState::new(manager));

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    // Setup signal handlers
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }

        cancel_clone.cancel();
    });

    let server = IpcServer::new(bind_addr.clone(), Arc::clone(&state)).with_shutdown_token(cancel);
    print_success(&format!("Daemon listening on {}", bind_addr));

    let result = server.run().await;

    // Close the SSH session whatever ended the server
    state.shutdown().await;
    print_info("Daemon stopped");
    result
}

async fn stop_daemon(config_path: Option<&PathBuf>) -> Result<()> {
    let config = config::load_or_default(config_path.map(PathBuf::as_path))
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    let mut client = DaemonClient::with_address(config.ipc_address());
    print_info("Stopping daemon...");
    match client.shutdown().await {
        Ok(()) => {
            print_success("Daemon stopped");
            Ok(())
        }
        Err(e) if e.to_string().contains("Is it running") => {
            print_warning("Daemon is not running");
            Ok(())
        }
        Err(e) => Err(e.context("Failed to stop daemon")),
    }
}
