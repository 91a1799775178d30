//! sorcha-node — the Sorcha governance-and-genesis node binary.
//!
//! Startup sequence:
//!   1. Open (or initialise) the sled-backed repository
//!   2. Load the wallet directory (or start with an empty one for local dev)
//!   3. Wire the registration orchestrator, validator, docket builder, and
//!      DID resolver around the shared repository and lock table
//!   4. Start the JSON-RPC 2.0 server
//!   5. Run the docket-builder timer loop, sealing every known register on
//!      the configured interval (§4.5 "periodically... runs per register")

mod wallet_directory;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use sorcha_core::constants::DEFAULT_DOCKET_BUILD_INTERVAL_SECS;
use sorcha_core::TransactionAdmitter;
use sorcha_did::resolver::DidResolver;
use sorcha_did::WalletStore;
use sorcha_orchestrator::{AllowAllTenants, RegistrationOrchestrator};
use sorcha_repository::{RegisterLocks, RegisterRepository, SledRepository};
use sorcha_rpc::{RpcServer, RpcServerState};
use sorcha_validator::{DocketBuilder, SenderKeyResolver, Validator};

use wallet_directory::WalletDirectory;

#[derive(Parser, Debug)]
#[command(
    name = "sorcha-node",
    version,
    about = "Sorcha node — permissioned-register governance and genesis pipeline"
)]
struct Args {
    /// Directory for the persistent repository.
    #[arg(long, default_value = "~/.sorcha/data")]
    data_dir: PathBuf,

    /// JSON-RPC listen address.
    #[arg(long, default_value = "127.0.0.1:8645")]
    rpc_addr: SocketAddr,

    /// Path to a wallet directory JSON file (array of
    /// `{address, public_key_hex, algorithm, suspended?}`). Omit to start
    /// with an empty directory — only the configured system wallet can
    /// then submit transactions.
    #[arg(long)]
    wallets_file: Option<PathBuf>,

    /// The wallet address the orchestrator and validator treat as the
    /// trusted system-wallet signer (§6), exempt from signature
    /// re-verification at admission.
    #[arg(long, default_value = "w:system")]
    system_wallet: String,

    /// Docket-builder poll interval, in seconds.
    #[arg(long, default_value_t = DEFAULT_DOCKET_BUILD_INTERVAL_SECS)]
    docket_build_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sorcha=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("Sorcha node starting");

    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let repository: Arc<dyn RegisterRepository> =
        Arc::new(SledRepository::open(&data_dir).context("opening repository")?);

    let wallets = Arc::new(load_wallets(args.wallets_file.as_deref())?);

    let locks = Arc::new(RegisterLocks::new());

    let validator = Arc::new(Validator::new(
        Arc::clone(&repository),
        Arc::clone(&locks),
        Arc::clone(&wallets) as Arc<dyn SenderKeyResolver>,
        args.system_wallet.clone(),
    ));

    let orchestrator = Arc::new(RegistrationOrchestrator::new(
        Arc::clone(&repository),
        Arc::clone(&locks),
        Arc::clone(&validator) as Arc<dyn TransactionAdmitter>,
        Arc::new(AllowAllTenants),
        args.system_wallet.clone(),
    ));

    let docket_builder = Arc::new(DocketBuilder::new(Arc::clone(&repository), Arc::clone(&locks)));

    let did_resolver = Arc::new(DidResolver::new(
        Arc::clone(&repository),
        Arc::clone(&wallets) as Arc<dyn WalletStore>,
    ));

    let rpc_state = Arc::new(RpcServerState {
        repository: Arc::clone(&repository),
        orchestrator,
        validator,
        docket_builder: Arc::clone(&docket_builder),
        did_resolver,
    });

    let _rpc_handle = RpcServer::new(rpc_state)
        .start(args.rpc_addr)
        .await
        .context("starting RPC server")?;

    info!(addr = %args.rpc_addr, "node ready");

    let mut ticker = tokio::time::interval(Duration::from_secs(args.docket_build_interval_secs));
    loop {
        ticker.tick().await;
        let now = chrono::Utc::now().timestamp();
        let register_ids = match repository.list_register_ids() {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "failed to list registers for docket build");
                continue;
            }
        };
        for register_id in register_ids {
            match docket_builder.build(register_id, now) {
                Ok(Some(docket)) => {
                    info!(register_id = %register_id, docket_id = docket.id, "docket sealed");
                }
                Ok(None) => {}
                Err(e) => warn!(register_id = %register_id, error = %e, "docket build failed"),
            }
        }
    }
}

/// Load the wallet directory from `path`, or start empty if none was
/// given — local development only; a production deployment wires a real
/// wallet-service-backed `WalletStore`/`SenderKeyResolver` instead.
fn load_wallets(path: Option<&Path>) -> anyhow::Result<WalletDirectory> {
    match path {
        Some(p) => WalletDirectory::load(p).with_context(|| format!("loading wallet directory from {}", p.display())),
        None => {
            warn!("no --wallets-file provided — starting with an empty wallet directory");
            Ok(WalletDirectory::empty())
        }
    }
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
