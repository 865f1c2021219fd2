//! Data source configuration settings and environment variable handling

use std::env;

// Contract constants
pub const DEFAULT_POOLS_CONTRACT_ADDRESS: &str = "vite_a1ff9c0ab0a7a1c4d0fb7a9e1b4e4a9c6b3ab1c2e4f0d5c6a7";
pub const DEFAULT_CONTRACT_DESCRIPTOR_PATH: &str = "assets/contracts/vite_staking_pools.json";

// Network constants
pub const DEFAULT_VITE_RPC_URL: &str = "https://node.vite.net/gvite";
pub const DEFAULT_VITEX_API_URL: &str = "https://api.vitex.net";
pub const NETWORK_HEIGHT_TTL_MS: u64 = 500;
pub const SECONDS_PER_BLOCK: i64 = 1;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RPC_MAX_ATTEMPTS: u32 = 3;
pub const MAX_RPC_ATTEMPTS: u32 = 10;

// Pool aggregation
pub const DEFAULT_POOL_FETCH_CONCURRENCY: usize = 1;
pub const MAX_POOL_FETCH_CONCURRENCY: usize = 16;

// Token constants
pub const TOKEN_REFERENCE_BASE_URL: &str = "https://coinmarketcap.com/currencies/";
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

#[derive(Debug, Clone)]
pub struct Config {
    pub vite_rpc_url: String,
    pub vitex_api_url: String,
    pub pools_contract_address: String,
    pub contract_descriptor_path: String,
    pub pool_fetch_concurrency: usize,
    pub http_timeout_secs: u64,
    pub rpc_max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vite_rpc_url: DEFAULT_VITE_RPC_URL.to_string(),
            vitex_api_url: DEFAULT_VITEX_API_URL.to_string(),
            pools_contract_address: DEFAULT_POOLS_CONTRACT_ADDRESS.to_string(),
            contract_descriptor_path: DEFAULT_CONTRACT_DESCRIPTOR_PATH.to_string(),
            pool_fetch_concurrency: DEFAULT_POOL_FETCH_CONCURRENCY,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            rpc_max_attempts: DEFAULT_RPC_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            vite_rpc_url: env::var("VITE_RPC_URL").unwrap_or(defaults.vite_rpc_url),
            vitex_api_url: env::var("VITEX_API_URL").unwrap_or(defaults.vitex_api_url),
            pools_contract_address: env::var("POOLS_CONTRACT_ADDRESS")
                .unwrap_or(defaults.pools_contract_address),
            contract_descriptor_path: env::var("CONTRACT_DESCRIPTOR_PATH")
                .unwrap_or(defaults.contract_descriptor_path),
            pool_fetch_concurrency: env::var("POOL_FETCH_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.pool_fetch_concurrency)
                .clamp(1, MAX_POOL_FETCH_CONCURRENCY),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.http_timeout_secs)
                .max(1),
            rpc_max_attempts: env::var("RPC_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rpc_max_attempts)
                .clamp(1, MAX_RPC_ATTEMPTS),
        }
    }
}
