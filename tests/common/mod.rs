#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vite_pools::{
    cache::TokenCache,
    datasource::{DataSourceCore, ViteDataSource},
    errors::{DataSourceError, DataSourceResult},
    events::EventBus,
    network::{LedgerRpc, TokenDetailProvider},
    storage::StaticContractSource,
    types::{AbiEntry, OffChainField, TokenDetail},
    wallet::InMemoryWalletManager,
};

pub const DESCRIPTOR: &str = include_str!("../../assets/contracts/vite_staking_pools.json");
pub const CONTRACT_ADDRESS: &str = "vite_0000000000000000000000000000000000000001c8b3f2d4e5";
pub const VITE: &str = "tti_5649544520544f4b454e6e40";
pub const USER: &str = "vite_ab24ef68b84e642c0ddca06beec81c9acb1977bbd7da27a87a";
pub const ONE: u128 = 1_000_000_000_000_000_000;

fn field(name: &str, value: Value) -> OffChainField {
    OffChainField {
        name: name.to_string(),
        value,
    }
}

/// In-memory ledger that records every call it serves.
pub struct FakeLedger {
    pub height: Mutex<Option<u64>>,
    pub pool_count: u64,
    pub end_block: u64,
    pub failing_pools: HashSet<u64>,
    pub stakes: HashMap<(u64, String), u128>,
    pub height_requests: AtomicUsize,
    pub offchain_calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeLedger {
    pub fn new(pool_count: u64, height: u64) -> Self {
        Self {
            height: Mutex::new(Some(height)),
            pool_count,
            end_block: height + 1_000,
            failing_pools: HashSet::new(),
            stakes: HashMap::new(),
            height_requests: AtomicUsize::new(0),
            offchain_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, id: u64) -> Self {
        self.failing_pools.insert(id);
        self
    }

    pub fn with_stake(mut self, pool_id: u64, account: &str, amount: u128) -> Self {
        self.stakes.insert((pool_id, account.to_string()), amount);
        self
    }

    pub fn set_height(&self, height: Option<u64>) {
        *self.height.lock().unwrap() = height;
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.offchain_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == method)
            .count()
    }

    pub fn total_offchain_calls(&self) -> usize {
        self.offchain_calls.lock().unwrap().len()
    }

    fn pool_info(&self, id: u64) -> Vec<OffChainField> {
        vec![
            field("stakingTokenId", json!(VITE)),
            field("rewardTokenId", json!(VITE)),
            field("totalStakingBalance", json!((31_536_000 * ONE).to_string())),
            field("totalRewardBalance", json!((1_000 * ONE).to_string())),
            field("startBlock", json!("1")),
            field("endBlock", json!(self.end_block.to_string())),
            field("latestRewardBlock", json!("1")),
            field("rewardPerPeriod", json!(ONE.to_string())),
            field("paidOut", json!(id.to_string())),
        ]
    }
}

#[async_trait]
impl LedgerRpc for FakeLedger {
    async fn request(&self, method: &str, _params: Vec<Value>) -> DataSourceResult<Value> {
        assert_eq!(method, "ledger_getSnapshotChainHeight");
        self.height_requests.fetch_add(1, Ordering::SeqCst);
        match *self.height.lock().unwrap() {
            Some(height) => Ok(json!(height.to_string())),
            None => Err(DataSourceError::network("height", anyhow::anyhow!("node unreachable"))),
        }
    }

    async fn call_off_chain_method(
        &self,
        contract_address: &str,
        abi: &AbiEntry,
        _off_chain_code: &str,
        args: Vec<Value>,
    ) -> DataSourceResult<Vec<OffChainField>> {
        assert_eq!(contract_address, CONTRACT_ADDRESS);
        let name = abi.name.clone().unwrap_or_default();
        self.offchain_calls.lock().unwrap().push((name.clone(), args.clone()));

        match name.as_str() {
            "getPoolCount" => Ok(vec![field("count", json!(self.pool_count.to_string()))]),
            "getPoolInfo" => {
                let id = args[0].as_u64().unwrap();
                if self.failing_pools.contains(&id) {
                    return Err(DataSourceError::network(
                        format!("pool {}", id),
                        anyhow::anyhow!("execution reverted"),
                    ));
                }
                Ok(self.pool_info(id))
            }
            "getUserInfo" => {
                let id = args[0].as_u64().unwrap();
                let account = args[1].as_str().unwrap().to_string();
                let stake = self.stakes.get(&(id, account)).copied().unwrap_or(0);
                Ok(vec![
                    field("stakingBalance", json!(stake.to_string())),
                    field("rewardDebt", json!("0")),
                    field("depositBlock", json!("1")),
                ])
            }
            other => panic!("unexpected offchain method {}", other),
        }
    }
}

/// Knows VITE only; counts lookups.
pub struct FakeTokenDetails {
    pub lookups: AtomicUsize,
    pub decimals: AtomicU32,
}

impl Default for FakeTokenDetails {
    fn default() -> Self {
        Self {
            lookups: AtomicUsize::new(0),
            decimals: AtomicU32::new(18),
        }
    }
}

#[async_trait]
impl TokenDetailProvider for FakeTokenDetails {
    async fn get_token_detail(&self, id: &str) -> DataSourceResult<Option<TokenDetail>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if id != VITE {
            return Ok(None);
        }
        Ok(Some(TokenDetail {
            name: "Vite Token".to_string(),
            symbol: "VITE".to_string(),
            original_symbol: "VITE".to_string(),
            token_decimals: self.decimals.load(Ordering::SeqCst),
            url_icon: Some("https://static.vite.net/image-1257137467/logo/VITE-logo.png".to_string()),
        }))
    }
}

pub struct Harness {
    pub data_source: ViteDataSource,
    pub ledger: Arc<FakeLedger>,
    pub details: Arc<FakeTokenDetails>,
    pub bus: Arc<EventBus>,
    pub wallet: Arc<InMemoryWalletManager>,
}

pub fn harness_with(ledger: FakeLedger, contract_address: &str, descriptor: &str) -> Harness {
    let ledger = Arc::new(ledger);
    let details = Arc::new(FakeTokenDetails::default());
    let bus = Arc::new(EventBus::new());
    let wallet = Arc::new(InMemoryWalletManager::new());
    let core = DataSourceCore::new(
        bus.clone(),
        wallet.clone(),
        details.clone(),
        Arc::new(TokenCache::new()),
    );
    let data_source = ViteDataSource::new(
        core,
        ledger.clone(),
        Arc::new(StaticContractSource::new(descriptor)),
        contract_address,
    );
    Harness {
        data_source,
        ledger,
        details,
        bus,
        wallet,
    }
}

pub fn harness(ledger: FakeLedger) -> Harness {
    harness_with(ledger, CONTRACT_ADDRESS, DESCRIPTOR)
}
