mod common;

use common::*;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use vite_pools::{
    DataSource, DataSourceError, PoolFilterValues, PoolSortOrder,
    wallet::WalletAccount,
};

async fn initialized(ledger: FakeLedger) -> Harness {
    let harness = harness(ledger);
    assert_ok!(harness.data_source.init().await);
    harness
}

fn descriptor_without(method: &str) -> String {
    let mut descriptor: Value = serde_json::from_str(DESCRIPTOR).unwrap();
    descriptor["abi"]
        .as_array_mut()
        .unwrap()
        .retain(|entry| entry["name"] != method);
    descriptor.to_string()
}

#[tokio::test]
async fn test_get_pools_skips_failed_pool() {
    let harness = initialized(FakeLedger::new(5, 10_000).failing(2)).await;

    let pools = assert_ok!(harness.data_source.get_pools(None).await);
    let ids: Vec<u64> = pools.iter().map(|p| p.id).collect();

    assert_eq!(ids, vec![0, 1, 3, 4]);
    assert_eq!(harness.ledger.calls_to("getPoolCount"), 1);
    assert_eq!(harness.ledger.calls_to("getPoolInfo"), 5);
}

#[tokio::test]
async fn test_concurrent_pool_fetch_keeps_order() {
    let harness = harness(FakeLedger::new(8, 10_000).failing(2).failing(5));
    let data_source = harness.data_source.with_pool_fetch_concurrency(4);
    assert_ok!(data_source.init().await);

    let pools = assert_ok!(data_source.get_pools(None).await);
    let ids: Vec<u64> = pools.iter().map(|p| p.id).collect();

    assert_eq!(ids, vec![0, 1, 3, 4, 6, 7]);
}

#[tokio::test]
async fn test_pool_count_failure_propagates() {
    let harness = initialized(FakeLedger::new(0, 10_000)).await;
    assert_eq!(assert_ok!(harness.data_source.get_pools(None).await).len(), 0);

    let broken = harness_with(
        FakeLedger::new(3, 10_000),
        CONTRACT_ADDRESS,
        &descriptor_without("getPoolCount"),
    );
    assert_ok!(broken.data_source.init().await);
    let err = assert_err!(broken.data_source.get_pools(None).await);
    assert!(matches!(err, DataSourceError::MethodNotFound(ref name) if name == "getPoolCount"));
    assert_eq!(broken.ledger.calls_to("getPoolInfo"), 0);
}

#[tokio::test]
async fn test_get_pool_resolves_tokens_apr_and_end_time() {
    let harness = initialized(FakeLedger::new(1, 10_000)).await;

    let before = chrono::Utc::now().timestamp();
    let pool = assert_ok!(harness.data_source.get_pool(0, None).await);
    let after = chrono::Utc::now().timestamp();

    assert_eq!(pool.staking_token.symbol, "VITE");
    assert_eq!(pool.reward_token.url, "https://coinmarketcap.com/currencies/Vite-Token");
    assert_eq!(pool.end_block, 11_000);
    assert!(pool.end_timestamp >= before + 1_000 && pool.end_timestamp <= after + 1_000);
    assert_eq!(pool.apr, Some(dec!(100)));
    assert!(pool.user_info.is_none());
    // staking and reward token are the same id
    assert_eq!(harness.details.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unrepresentable_decimals_leave_apr_empty() {
    let harness = initialized(FakeLedger::new(2, 10_000)).await;
    harness.details.decimals.store(30, Ordering::SeqCst);

    let pools = assert_ok!(harness.data_source.get_pools(None).await);

    assert_eq!(pools.len(), 2);
    assert_eq!(pools[0].staking_token.decimals, 30);
    assert!(pools.iter().all(|p| p.apr.is_none()));
}

#[tokio::test]
async fn test_offchain_method_scanned_once() {
    let harness = initialized(FakeLedger::new(1, 10_000)).await;

    for _ in 0..10 {
        assert_ok!(harness.data_source.get_pool(0, None).await);
    }

    assert_eq!(harness.data_source.offchain_methods().scans(), 1);
    assert_eq!(harness.ledger.calls_to("getPoolInfo"), 10);
}

#[tokio::test]
async fn test_missing_method_reports_name() {
    let harness = harness_with(
        FakeLedger::new(1, 10_000),
        CONTRACT_ADDRESS,
        &descriptor_without("getUserInfo"),
    );
    assert_ok!(harness.data_source.init().await);

    let err = assert_err!(harness.data_source.get_pool_user_info(0, Some(USER)).await);
    assert_eq!(err.to_string(), "The offchain method 'getUserInfo' does not exist");
    assert_eq!(harness.ledger.total_offchain_calls(), 0);
}

#[tokio::test]
async fn test_user_info_without_account_skips_rpc() {
    let harness = initialized(FakeLedger::new(1, 10_000)).await;

    assert_eq!(assert_ok!(harness.data_source.get_pool_user_info(0, None).await), None);
    assert_eq!(assert_ok!(harness.data_source.get_pool_user_info(0, Some("")).await), None);
    assert_eq!(assert_ok!(harness.data_source.get_pool_user_info(0, Some("   ")).await), None);
    assert_eq!(assert_ok!(harness.data_source.get_pool_user_info(0, Some("\t\n")).await), None);
    assert_eq!(harness.ledger.total_offchain_calls(), 0);
}

#[tokio::test]
async fn test_user_info_for_account() {
    let harness = initialized(FakeLedger::new(2, 10_000).with_stake(1, USER, 42)).await;

    let info = assert_ok!(harness.data_source.get_pool_user_info(1, Some(USER)).await).unwrap();
    assert_eq!(info.staking_balance, 42);
    assert_eq!(info.deposit_block, 1);

    let pools = assert_ok!(harness.data_source.get_pools(Some(USER)).await);
    assert!(!pools[0].has_user_stake());
    assert!(pools[1].has_user_stake());
}

#[tokio::test]
async fn test_contract_not_loaded() {
    let empty_address = harness_with(FakeLedger::new(1, 10_000), "", DESCRIPTOR);
    assert_ok!(empty_address.data_source.init().await);
    assert!(matches!(
        empty_address.data_source.get_pool(0, None).await,
        Err(DataSourceError::ContractNotLoaded)
    ));
    assert!(matches!(
        empty_address.data_source.get_total_pools().await,
        Err(DataSourceError::ContractNotLoaded)
    ));

    let uninitialized = harness(FakeLedger::new(1, 10_000));
    assert!(matches!(
        uninitialized.data_source.get_pool_user_info(0, Some(USER)).await,
        Err(DataSourceError::ContractNotLoaded)
    ));
    assert_eq!(uninitialized.ledger.total_offchain_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_network_height_is_cached() {
    let harness = initialized(FakeLedger::new(0, 777)).await;
    let data_source = &harness.data_source;

    assert_eq!(data_source.get_network_block_height().await, 777);
    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(data_source.get_network_block_height().await, 777);
    assert_eq!(harness.ledger.height_requests.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_millis(500)).await;
    harness.ledger.set_height(Some(778));
    assert_eq!(data_source.get_network_block_height().await, 778);
    assert_eq!(harness.ledger.height_requests.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_height_requests_coalesce() {
    let harness = initialized(FakeLedger::new(0, 777)).await;
    let data_source = &harness.data_source;

    let heights = futures::future::join_all((0..10).map(|_| data_source.get_network_block_height())).await;

    assert!(heights.iter().all(|h| *h == 777));
    assert_eq!(harness.ledger.height_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_height_failure_yields_zero() {
    let ledger = FakeLedger::new(0, 777);
    ledger.set_height(None);
    let harness = initialized(ledger).await;

    assert_eq!(harness.data_source.get_network_block_height().await, 0);
    assert_err!(harness.data_source.try_get_network_block_height().await);

    // estimated from height 0
    let now = chrono::Utc::now().timestamp();
    let estimate = harness.data_source.get_end_timestamp(5_000).await;
    assert!((estimate - (now + 5_000)).abs() <= 2);
}

#[tokio::test]
async fn test_pools_stay_live_when_height_unavailable() {
    let ledger = FakeLedger::new(3, 10_000);
    ledger.set_height(None);
    let harness = initialized(ledger).await;

    let pools = assert_ok!(harness.data_source.get_filtered_pools(None).await);

    assert_eq!(pools.iter().map(|p| p.id).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(pools.iter().all(|p| p.is_live()));
    assert!(pools.iter().all(|p| p.apr == Some(dec!(100))));
}

#[tokio::test]
async fn test_end_timestamp_estimation() {
    let harness = initialized(FakeLedger::new(0, 1_000)).await;
    let data_source = &harness.data_source;

    assert_eq!(data_source.get_end_timestamp(0).await, 0);
    assert_eq!(data_source.get_end_timestamp(900).await, 0);
    assert_eq!(data_source.get_end_timestamp(1_000).await, 0);

    let now = chrono::Utc::now().timestamp();
    let estimate = data_source.get_end_timestamp(1_120).await;
    assert!((estimate - (now + 120)).abs() <= 2);
}

#[tokio::test]
async fn test_tokens_fetched_once_across_pools() {
    let harness = initialized(FakeLedger::new(4, 10_000)).await;

    assert_ok!(harness.data_source.get_pools(None).await);
    assert_ok!(harness.data_source.get_pools(None).await);

    assert_eq!(harness.details.lookups.load(Ordering::SeqCst), 1);

    let unknown = harness.data_source.get_token("tti_000000000000000000004cfd").await;
    assert!(unknown.is_unknown());
    assert_eq!(unknown.decimals, 18);
}

#[tokio::test]
async fn test_write_operations_not_implemented() {
    let harness = initialized(FakeLedger::new(1, 10_000)).await;
    let data_source = &harness.data_source;

    assert!(matches!(data_source.deposit(0, "100").await, Err(DataSourceError::NotImplemented(_))));
    assert!(matches!(data_source.withdraw(0, "100").await, Err(DataSourceError::NotImplemented(_))));
    assert!(matches!(data_source.get_balance(USER).await, Err(DataSourceError::NotImplemented(_))));
}

#[tokio::test]
async fn test_account_follows_wallet() {
    let harness = initialized(FakeLedger::new(0, 10_000)).await;

    assert!(matches!(
        harness.data_source.get_account(),
        Err(DataSourceError::PreconditionFailed(_))
    ));
    harness.wallet.connect(WalletAccount::new(USER));
    assert_eq!(assert_ok!(harness.data_source.get_account()).address, USER);
}

#[tokio::test]
async fn test_dispose_rejects_further_calls() {
    let harness = initialized(FakeLedger::new(2, 10_000)).await;
    assert_eq!(harness.bus.subscriber_count(), 1);

    harness.data_source.dispose();
    harness.data_source.dispose();

    assert_eq!(harness.bus.subscriber_count(), 0);
    assert!(matches!(
        harness.data_source.get_pools(None).await,
        Err(DataSourceError::InvalidState(_))
    ));
    assert!(matches!(harness.data_source.init().await, Err(DataSourceError::InvalidState(_))));
    assert_eq!(harness.data_source.get_network_block_height().await, 0);
}

#[tokio::test]
async fn test_init_twice_is_rejected() {
    let harness = initialized(FakeLedger::new(0, 10_000)).await;
    assert!(matches!(harness.data_source.init().await, Err(DataSourceError::InvalidState(_))));
    assert_eq!(harness.bus.subscriber_count(), 1);
}

#[tokio::test]
async fn test_bad_descriptor_rolls_back_init() {
    let harness = harness_with(FakeLedger::new(1, 10_000), CONTRACT_ADDRESS, "{ not json");

    let err = assert_err!(harness.data_source.init().await);
    assert!(matches!(err, DataSourceError::Descriptor { .. }));
    assert_eq!(harness.bus.subscriber_count(), 0);

    // rolled back to uninitialized, so init may run again
    assert!(matches!(
        harness.data_source.init().await,
        Err(DataSourceError::Descriptor { .. })
    ));
}

#[tokio::test]
async fn test_filtered_pools_follow_filter_events() {
    let harness = initialized(FakeLedger::new(3, 10_000).with_stake(2, USER, 5)).await;

    let all = assert_ok!(harness.data_source.get_filtered_pools(Some(USER)).await);
    assert_eq!(all.len(), 3);

    let old_values = PoolFilterValues::default();
    let new_values = PoolFilterValues {
        staked_only: true,
        sort: PoolSortOrder::TotalStaked,
        ..Default::default()
    };
    harness.bus.publish_pool_filter_values_changed(&old_values, &new_values);

    let staked = assert_ok!(harness.data_source.get_filtered_pools(Some(USER)).await);
    assert_eq!(staked.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2]);
    assert_eq!(harness.data_source.core().pool_filter_values(), new_values);
}
