//! Data source backed by the Vite ledger and the staking pools contract

use async_trait::async_trait;
use futures::{StreamExt, stream};
use serde_json::{Value, json};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info};
use crate::{
    cache::{CachedFunctionCall, TokenCache},
    config::{Config, NETWORK_HEIGHT_TTL_MS},
    errors::{DataSourceError, DataSourceResult},
    events::EventBus,
    network::{
        HttpLedgerClient, LedgerRpc, PriceSource, SNAPSHOT_CHAIN_HEIGHT_METHOD, VitexClient,
    },
    pools::resolve_apr,
    storage::{ContractSource, FileContractSource},
    types::{Contract, OffChainField, Pool, PoolUserInfo},
    wallet::WalletManager,
};
use super::{
    base::DataSourceCore,
    decode::{
        ContractPool, ContractPoolUserInfo, OffChainMethod, decode_pool_count,
        fields_from_entries, parse_u64,
    },
    method_index::OffChainMethodIndex,
    source::DataSource,
};

pub struct ViteDataSource {
    core: DataSourceCore,
    client: Arc<dyn LedgerRpc>,
    contracts: Arc<dyn ContractSource>,
    prices: Option<Arc<dyn PriceSource>>,
    contract_address: String,
    pool_fetch_concurrency: usize,
    offchain_methods: OffChainMethodIndex,
    cached_network_block_height: CachedFunctionCall<u64>,
    contract: RwLock<Option<Arc<Contract>>>,
}

impl ViteDataSource {
    pub fn new(
        core: DataSourceCore,
        client: Arc<dyn LedgerRpc>,
        contracts: Arc<dyn ContractSource>,
        contract_address: &str,
    ) -> Self {
        let rpc = client.clone();
        // at most one height request every NETWORK_HEIGHT_TTL_MS
        let cached_network_block_height = CachedFunctionCall::new(NETWORK_HEIGHT_TTL_MS, move || {
            let rpc = rpc.clone();
            async move {
                let value = rpc.request(SNAPSHOT_CHAIN_HEIGHT_METHOD, Vec::new()).await?;
                parse_u64(&value)
                    .map_err(|e| DataSourceError::parsing("Invalid snapshot chain height", e))
            }
        });

        info!("ViteDataSource loaded");
        Self {
            core,
            client,
            contracts,
            prices: None,
            contract_address: contract_address.to_string(),
            pool_fetch_concurrency: 1,
            offchain_methods: OffChainMethodIndex::new(),
            cached_network_block_height,
            contract: RwLock::new(None),
        }
    }

    /// Wires the HTTP clients, descriptor file and process-wide caches from `config`.
    pub fn from_config(config: &Config, wallet: Arc<dyn WalletManager>) -> DataSourceResult<Self> {
        let core = DataSourceCore::new(
            EventBus::global(),
            wallet,
            Arc::new(VitexClient::from_config(config)?),
            TokenCache::global(),
        );
        Ok(Self::new(
            core,
            Arc::new(HttpLedgerClient::from_config(config)?),
            Arc::new(FileContractSource::new(&config.contract_descriptor_path)),
            &config.pools_contract_address,
        )
        .with_pool_fetch_concurrency(config.pool_fetch_concurrency))
    }

    pub fn with_price_source(mut self, prices: Arc<dyn PriceSource>) -> Self {
        self.prices = Some(prices);
        self
    }

    /// Pools fetched at once by `get_pools`; 1 fetches strictly in sequence.
    pub fn with_pool_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.pool_fetch_concurrency = concurrency.max(1);
        self
    }

    pub fn offchain_methods(&self) -> &OffChainMethodIndex {
        &self.offchain_methods
    }

    fn contract(&self) -> DataSourceResult<Arc<Contract>> {
        self.contract
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|contract| !contract.address.is_empty())
            .cloned()
            .ok_or(DataSourceError::ContractNotLoaded)
    }

    async fn load_contract(&self) -> DataSourceResult<()> {
        let json = self
            .contracts
            .read_descriptor()
            .await
            .map_err(|e| DataSourceError::Descriptor {
                message: "Failed to load contract descriptor".to_string(),
                source: e,
            })?;
        let mut contract = Contract::from_json(&json).map_err(|e| DataSourceError::Descriptor {
            message: "Failed to parse contract descriptor".to_string(),
            source: e.into(),
        })?;
        contract.address = self.contract_address.clone();

        info!(
            contract = %contract.contract_name,
            address = %contract.address,
            "Contract loaded"
        );
        *self.contract.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(contract));
        Ok(())
    }

    async fn call_offchain(
        &self,
        method: OffChainMethod,
        args: Vec<Value>,
    ) -> DataSourceResult<Vec<OffChainField>> {
        self.core.ensure_not_disposed()?;
        let contract = self.contract()?;
        let abi = self.offchain_methods.resolve(&contract, method.name())?;
        debug!(method = method.name(), ?args, "Calling offchain method");
        self.client
            .call_off_chain_method(&contract.address, &abi, &contract.off_chain, args)
            .await
    }

    async fn to_pool(&self, id: u64, raw: ContractPool) -> Pool {
        let staking_token = self.core.get_token(&raw.staking_token_id).await;
        let reward_token = self.core.get_token(&raw.reward_token_id).await;
        let end_timestamp = self.get_end_timestamp(raw.end_block).await;

        Pool {
            id,
            staking_token,
            reward_token,
            total_staking_balance: raw.total_staking_balance,
            total_reward_balance: raw.total_reward_balance,
            start_block: raw.start_block,
            end_block: raw.end_block,
            latest_reward_block: raw.latest_reward_block,
            reward_per_period: raw.reward_per_period,
            paid_out: raw.paid_out,
            end_timestamp,
            apr: None,
            user_info: None,
        }
    }
}

#[async_trait]
impl DataSource for ViteDataSource {
    fn core(&self) -> &DataSourceCore {
        &self.core
    }

    async fn init(&self) -> DataSourceResult<()> {
        self.core.begin_init()?;
        match self.load_contract().await {
            Ok(()) => {
                self.core.complete_init();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to initialize ViteDataSource");
                self.core.abort_init();
                Err(e)
            }
        }
    }

    fn dispose(&self) {
        if self.core.dispose() {
            self.offchain_methods.clear();
        }
    }

    async fn get_balance(&self, _address: &str) -> DataSourceResult<u128> {
        Err(DataSourceError::NotImplemented("getBalance"))
    }

    async fn try_get_network_block_height(&self) -> DataSourceResult<u64> {
        self.core.ensure_not_disposed()?;
        self.cached_network_block_height.get().await
    }

    async fn get_pool(&self, id: u64, account: Option<&str>) -> DataSourceResult<Pool> {
        let result = self.call_offchain(OffChainMethod::GetPoolInfo, vec![json!(id)]).await?;
        let raw = ContractPool::decode(&fields_from_entries(result))?;

        let mut pool = self.to_pool(id, raw).await;
        pool.apr = resolve_apr(&pool, self.prices.as_deref()).await;
        pool.user_info = self.get_pool_user_info(id, account).await?;
        Ok(pool)
    }

    async fn get_pools(&self, account: Option<&str>) -> DataSourceResult<Vec<Pool>> {
        let total = self.get_total_pools().await?;

        // buffered() yields in input order, so ids stay ascending
        let results: Vec<(u64, DataSourceResult<Pool>)> = stream::iter(0..total)
            .map(|id| async move { (id, self.get_pool(id, account).await) })
            .buffered(self.pool_fetch_concurrency)
            .collect()
            .await;

        let mut pools = Vec::with_capacity(results.len());
        for (id, result) in results {
            match result {
                Ok(pool) => pools.push(pool),
                Err(e) => error!(pool_id = id, error = %e, "Failed to fetch pool, skipping"),
            }
        }
        debug!(total, fetched = pools.len(), "Pools aggregated");
        Ok(pools)
    }

    async fn get_pool_user_info(
        &self,
        pool_id: u64,
        account: Option<&str>,
    ) -> DataSourceResult<Option<PoolUserInfo>> {
        let Some(account) = account.filter(|a| !a.trim().is_empty()) else {
            return Ok(None);
        };
        let result = self
            .call_offchain(OffChainMethod::GetUserInfo, vec![json!(pool_id), json!(account)])
            .await?;
        let raw = ContractPoolUserInfo::decode(&fields_from_entries(result))?;
        Ok(Some(raw.into()))
    }

    async fn get_total_pools(&self) -> DataSourceResult<u64> {
        let result = self.call_offchain(OffChainMethod::GetPoolCount, Vec::new()).await?;
        decode_pool_count(&result)
    }

    async fn deposit(&self, _pool_id: u64, _amount: &str) -> DataSourceResult<bool> {
        Err(DataSourceError::NotImplemented("deposit"))
    }

    async fn withdraw(&self, _pool_id: u64, _amount: &str) -> DataSourceResult<bool> {
        Err(DataSourceError::NotImplemented("withdraw"))
    }
}
