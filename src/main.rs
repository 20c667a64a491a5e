//! pow-ledger CLI Application
//!
//! Runs a ledger node or works with wallets from the command line.

use clap::{Parser, Subcommand};
use pow_ledger::api::{create_router, ApiState};
use pow_ledger::config::{NodeConfig, DEFAULT_PORT};
use pow_ledger::core::{Blockchain, MINING_DIFFICULTY};
use pow_ledger::network::{HttpNotifier, NeighborProbe, PeerRegistry};
use pow_ledger::wallet::Wallet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "ledger")]
#[command(version = "0.1.0")]
#[command(about = "A single-node proof-of-work ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a ledger node with its HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Host address used as the base of neighbor scans
        #[arg(long, default_value_t = Ipv4Addr::LOCALHOST)]
        host: Ipv4Addr,

        /// Mining difficulty (leading zero hex digits)
        #[arg(short, long, default_value_t = MINING_DIFFICULTY)]
        difficulty: usize,

        /// Start the recurring miner immediately
        #[arg(long)]
        auto_mine: bool,

        /// Give up a mining pass after this many seconds
        #[arg(long)]
        mining_timeout_secs: Option<u64>,

        /// Owner wallet private key (a fresh wallet is generated if omitted)
        #[arg(long)]
        private_key: Option<String>,
    },

    /// Wallet operations
    Wallet {
        #[command(subcommand)]
        action: WalletCommands,
    },
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Create a new wallet
    New,

    /// Sign a transfer and print the submission JSON
    Sign {
        /// Sender's private key (hex)
        #[arg(long)]
        private_key: String,

        /// Recipient's address
        #[arg(short, long)]
        to: String,

        /// Amount to send
        #[arg(short, long)]
        value: f32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            host,
            difficulty,
            auto_mine,
            mining_timeout_secs,
            private_key,
        } => {
            let config = NodeConfig {
                host,
                port,
                difficulty,
                auto_mine,
                mining_timeout: mining_timeout_secs.map(Duration::from_secs),
                ..Default::default()
            };
            let owner = match private_key {
                Some(key) => Wallet::from_private_key(&key)?,
                None => Wallet::new(),
            };
            run_server(config, owner)?;
        }

        Commands::Wallet { action } => match action {
            WalletCommands::New => {
                let wallet = Wallet::new();
                println!("🔑 New wallet");
                println!("   Address:     {}", wallet.address());
                println!("   Public key:  {}", wallet.public_key());
                println!("   Private key: {}", wallet.private_key());
            }
            WalletCommands::Sign {
                private_key,
                to,
                value,
            } => {
                let wallet = Wallet::from_private_key(&private_key)?;
                let request = wallet.sign_transaction(&to, value)?;
                println!("{}", serde_json::to_string_pretty(&request)?);
            }
        },
    }

    Ok(())
}

fn run_server(config: NodeConfig, owner: Wallet) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let shutdown = CancellationToken::new();

        let peers = Arc::new(PeerRegistry::new());
        let notifier = Arc::new(HttpNotifier::new(Handle::current())?);
        let blockchain = Arc::new(
            Blockchain::with_difficulty(&owner.address(), config.difficulty)
                .with_network(Arc::clone(&peers), notifier),
        );

        log::debug!("private key {}", owner.private_key());
        log::info!("public key {}", owner.public_key());
        log::info!("blockchain address {}", owner.address());

        let probe: Arc<dyn NeighborProbe> = Arc::new(config.neighbor_probe());
        tokio::spawn(Arc::clone(&peers).run_sync(
            probe,
            config.neighbor_sync_interval,
            shutdown.clone(),
        ));

        let state = ApiState::new(blockchain, config.clone(), shutdown.clone());
        if config.auto_mine {
            state.start_mining();
        }

        let app = create_router(state);
        let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
        println!("🚀 Ledger node listening on http://{}:{}", config.host, config.port);

        let signal = shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::signal::ctrl_c().await.ok();
                println!("\n📴 Shutting down ledger node...");
                signal.cancel();
            })
            .await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
