//! Route handlers.

use crate::{
    ApiError, ApiResult, ApiState, FeedParams,
    token::{TokenMetadata, token_metadata},
    tx::{BatchRequest, BatchResponse, TransactionView, transaction_batch, transaction_detail},
};
use alloy_primitives::{Address, B256, U256};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use chainscope_client::ChainClient;
use chainscope_primitives::{format_native, parse_address, parse_block_number, serde_str};
use chainscope_scanner::{
    ActivityPage, ActivityRequest, BlockPage, DEFAULT_ACTIVITY_SCAN_BLOCKS,
    DEFAULT_RECENT_SCAN_BLOCKS, LatestOverview, NetworkStats, RecentPage, StartBlock, clamp_limit,
    latest_overview, network_stats, recent_transactions,
};
use chainscope_validators::{ValidatorRecord, ValidatorSet, ValidatorSource};
use serde::Serialize;

/// Fraction digits of a balance in native units.
const BALANCE_DIGITS: usize = 6;

/// `GET /health`
pub(crate) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn feed_params(query: Result<Query<FeedParams>, QueryRejection>) -> ApiResult<FeedParams> {
    query.map(|Query(params)| params).map_err(|rejection| ApiError::Query(rejection.body_text()))
}

/// `GET /api/address/txs`
pub(crate) async fn address_txs<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
    query: Result<Query<FeedParams>, QueryRejection>,
) -> ApiResult<Json<ActivityPage>> {
    let params = feed_params(query)?;
    let request = ActivityRequest {
        address: params.address.clone().unwrap_or_default(),
        filter: params.filter()?,
        scan_blocks: params.scan_blocks(DEFAULT_ACTIVITY_SCAN_BLOCKS)?,
        limit: params.limit()?,
        cursor: params.cursor_block()?,
    };
    Ok(Json(state.activity.query_address_activity(&request).await?))
}

/// `GET /api/txs`
pub(crate) async fn recent_txs<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
    query: Result<Query<FeedParams>, QueryRejection>,
) -> ApiResult<Json<RecentPage>> {
    let params = feed_params(query)?;
    let page = recent_transactions(
        &state.scanner,
        params.limit()?,
        params.scan_blocks(DEFAULT_RECENT_SCAN_BLOCKS)?,
        params.cursor_block()?,
    )
    .await?;
    Ok(Json(page))
}

/// `GET /api/blocks`
pub(crate) async fn blocks<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
    query: Result<Query<FeedParams>, QueryRejection>,
) -> ApiResult<Json<BlockPage>> {
    let params = feed_params(query)?;
    let start = StartBlock::from(params.cursor()?);
    let page = state.scanner.list_blocks(start, clamp_limit(params.limit()?)).await?;
    Ok(Json(page))
}

/// `GET /api/blocks/latest`
pub(crate) async fn blocks_latest<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
) -> ApiResult<Json<LatestOverview>> {
    Ok(Json(latest_overview(&state.scanner).await?))
}

/// A single block with its transaction hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    /// The block number.
    #[serde(with = "serde_str::u64_dec")]
    pub number: u64,
    /// The block hash.
    pub hash: B256,
    /// The parent block hash.
    pub parent_hash: B256,
    /// The block timestamp in unix seconds.
    pub timestamp: u64,
    /// The transaction hashes in block order.
    pub txs: Vec<B256>,
}

/// `GET /api/block/{number}`
pub(crate) async fn block<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
    Path(number): Path<String>,
) -> ApiResult<Json<BlockView>> {
    let number = parse_block_number(&number)?;
    let block = state.client.block(number, false).await?.ok_or(ApiError::NotFound("Block"))?;
    Ok(Json(BlockView {
        number: block.header.number,
        hash: block.header.hash,
        parent_hash: block.parent_hash,
        timestamp: block.header.timestamp,
        txs: block.transaction_hashes,
    }))
}

/// `GET /api/tx/{hash}`
pub(crate) async fn transaction<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
    Path(hash): Path<String>,
) -> ApiResult<Json<TransactionView>> {
    Ok(Json(transaction_detail(state.client.as_ref(), &hash).await?))
}

/// `POST /api/tx/batch`
pub(crate) async fn transaction_batch_lookup<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<Json<BatchResponse>> {
    let Json(request) = body.map_err(|rejection| ApiError::Body(rejection.body_text()))?;
    Ok(Json(transaction_batch(state.client.as_ref(), &request).await))
}

/// The balance of an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    /// The queried address.
    pub address: Address,
    /// The balance in wei.
    #[serde(with = "serde_str::u256_dec")]
    pub balance_wei: U256,
    /// The balance in native units.
    pub balance_gen: String,
}

/// `GET /api/address/{addr}/balance`
pub(crate) async fn balance<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
    Path(address): Path<String>,
) -> ApiResult<Json<BalanceView>> {
    let address = parse_address(&address)?;
    let balance_wei = state.client.balance(address).await?;
    Ok(Json(BalanceView {
        address,
        balance_wei,
        balance_gen: format_native(balance_wei, BALANCE_DIGITS),
    }))
}

/// `GET /api/token/{addr}`
pub(crate) async fn token<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
    Path(address): Path<String>,
) -> ApiResult<Json<TokenMetadata>> {
    Ok(Json(token_metadata(state.client.as_ref(), &address).await?))
}

/// `GET /api/network/stats`
pub(crate) async fn network<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
) -> ApiResult<Json<NetworkStats>> {
    Ok(Json(network_stats(state.client.as_ref()).await?))
}

/// `GET /api/validators`
pub(crate) async fn validators<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
) -> ApiResult<Json<ValidatorSet>> {
    Ok(Json(state.validators.list_validators().await?))
}

/// `GET /api/validators/{addr}`
pub(crate) async fn validator<C: ChainClient, S: ValidatorSource>(
    State(state): State<ApiState<C, S>>,
    Path(address): Path<String>,
) -> ApiResult<Json<ValidatorRecord>> {
    Ok(Json(state.validators.validator_detail(&address).await?))
}

/// Fallback for unknown routes.
pub(crate) async fn not_found() -> ApiError {
    ApiError::NotFound("Route")
}
