//! Vite Pools - Main Entry Point
//!
//! Polls the staking pools contract and prints a pool table until interrupted.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info, warn};
use vite_pools::{
    wallet::{InMemoryWalletManager, WalletAccount},
    *,
};

const REFRESH_INTERVAL_SECS: u64 = 15;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    let _logging_guard = utils::setup_logging()?;

    let config = CONFIG.clone();

    info!("🏊 Vite Pools v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   RPC: {}", config.vite_rpc_url);
    info!("   Token API: {}", config.vitex_api_url);
    info!("   Contract: {}", config.pools_contract_address);
    info!("   Descriptor: {}", config.contract_descriptor_path);
    info!("   Pool fetch concurrency: {}", config.pool_fetch_concurrency);

    let wallet = Arc::new(InMemoryWalletManager::new());
    if let Ok(address) = std::env::var("WALLET_ADDRESS") {
        wallet.connect(WalletAccount::new(&address));
    }

    let data_source = ViteDataSource::from_config(&config, wallet.clone())?;
    data_source.init().await?;

    let account = data_source.get_account().ok().map(|a| a.address);
    if account.is_none() {
        warn!("No wallet connected, user stakes will not be shown");
    }

    // Setup shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("\n📛 Received shutdown signal (Ctrl+C)...");
        let _ = shutdown_tx.send(());
    });

    let mut interval = time::interval(Duration::from_secs(REFRESH_INTERVAL_SECS));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match data_source.get_filtered_pools(account.as_deref()).await {
                    Ok(pools) => {
                        let height = data_source.get_network_block_height().await;
                        utils::print_pools(&pools, height);
                    }
                    Err(e) => error!("Failed to load pools: {}", e),
                }
            }
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received, exiting main loop...");
                break;
            }
        }
    }

    data_source.dispose();
    Ok(())
}
