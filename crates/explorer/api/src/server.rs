//! Router assembly and the HTTP server.

use crate::{ApiError, ApiState, Metrics, handlers};
use axum::{
    Router,
    body::HttpBody,
    extract::{MatchedPath, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chainscope_client::{ChainClient, with_deadline};
use chainscope_validators::ValidatorSource;
use std::{future::Future, io, time::Instant};
use tokio::net::TcpListener;

/// Builds the API router over `state`.
///
/// Every route runs under the request deadline of the state and is logged and counted once
/// it completes.
pub fn router<C, S>(state: ApiState<C, S>) -> Router
where
    C: ChainClient + 'static,
    S: ValidatorSource + 'static,
{
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/address/txs", get(handlers::address_txs::<C, S>))
        .route("/api/address/{addr}/balance", get(handlers::balance::<C, S>))
        .route("/api/txs", get(handlers::recent_txs::<C, S>))
        .route("/api/tx/batch", post(handlers::transaction_batch_lookup::<C, S>))
        .route("/api/tx/{hash}", get(handlers::transaction::<C, S>))
        .route("/api/blocks", get(handlers::blocks::<C, S>))
        .route("/api/blocks/latest", get(handlers::blocks_latest::<C, S>))
        .route("/api/block/{number}", get(handlers::block::<C, S>))
        .route("/api/token/{addr}", get(handlers::token::<C, S>))
        .route("/api/network/stats", get(handlers::network::<C, S>))
        .route("/api/validators", get(handlers::validators::<C, S>))
        .route("/api/validators/{addr}", get(handlers::validator::<C, S>))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), track_request::<C, S>))
        .with_state(state)
}

/// Applies the request deadline, then logs and counts the response.
async fn track_request<C, S>(
    State(state): State<ApiState<C, S>>,
    request: Request,
    next: Next,
) -> Response
where
    C: ChainClient + 'static,
    S: ValidatorSource + 'static,
{
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |path| path.as_str().to_string());
    let query = request.uri().query().unwrap_or_default().to_string();
    let started = Instant::now();

    let response = match with_deadline::<_, ApiError, _>(state.request_timeout, async {
        Ok(next.run(request).await)
    })
    .await
    {
        Ok(response) => response,
        Err(err) => {
            metrics::counter!(Metrics::TIMEOUTS).increment(1);
            err.into_response()
        }
    };

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let bytes = response.body().size_hint().exact();
    if status.is_server_error() {
        warn!(target: "api", %route, %query, %status, elapsed_ms, "Request failed");
    } else {
        info!(target: "api", %route, %query, %status, elapsed_ms, ?bytes, "Request served");
    }
    metrics::counter!(
        Metrics::REQUESTS,
        "route" => route,
        "status" => status.as_str().to_string()
    )
    .increment(1);
    response
}

/// Serves `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(target: "api", %addr, "HTTP server listening");
    }
    axum::serve(listener, router).with_graceful_shutdown(shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiConfig;
    use axum::{
        body::Body,
        http::{self, Method, StatusCode, header},
    };
    use chainscope_client::test_utils::{
        FailureMode, MockChainClient, MockChainStorage, fixture_address, fixture_block,
        fixture_tx_hash,
    };
    use chainscope_validators::test_utils::MockValidatorSource;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::{sync::Arc, time::Duration};
    use tower::ServiceExt;

    fn app(storage: MockChainStorage, source: MockValidatorSource) -> Router {
        router(ApiState::new(
            Arc::new(MockChainClient::new(storage)),
            Arc::new(source),
            ApiConfig::default(),
        ))
    }

    /// Head 1000. Block 1000 sends from A, block 999 carries two transactions to A.
    fn scenario() -> MockChainStorage {
        let a = fixture_address(0xa);
        let b = fixture_address(0xb);
        let c = fixture_address(0xc);
        MockChainStorage::with_empty_chain(1000)
            .with_block(fixture_block(998, &[(b, Some(c))]))
            .with_block(fixture_block(999, &[(b, Some(a)), (c, Some(a))]))
            .with_block(fixture_block(1000, &[(a, Some(b))]))
    }

    async fn send(app: Router, request: Request) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, http::Request::get(uri).body(Body::empty()).unwrap()).await
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) =
            get_json(app(MockChainStorage::default(), MockValidatorSource::default()), "/health")
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_address_activity_page() {
        let uri = format!(
            "/api/address/txs?address={}&scanBlocks=3",
            fixture_address(0xa)
        );
        let (status, body) = get_json(app(scenario(), MockValidatorSource::default()), &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scannedBlocks"], 3);
        assert_eq!(body["nextCursorBlock"], "997");
        assert_eq!(body["fromBlock"], "997");
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["hash"], json!(fixture_tx_hash(1000, 0)));
        assert_eq!(items[1]["hash"], json!(fixture_tx_hash(999, 1)));
        assert_eq!(items[2]["hash"], json!(fixture_tx_hash(999, 0)));
        assert_eq!(items[0]["direction"], "OUT");
        assert_eq!(items[1]["direction"], "IN");
    }

    #[tokio::test]
    async fn test_bad_input_is_400() {
        for uri in [
            "/api/address/txs",
            "/api/address/txs?address=0x1234",
            "/api/txs?limit=many",
            "/api/txs?cursorBlock=abc",
            "/api/block/twelve",
            "/api/tx/0x1234",
            "/api/address/0xzz/balance",
        ] {
            let (status, body) =
                get_json(app(scenario(), MockValidatorSource::default()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["kind"], "invalid_input", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_oversized_counts_are_clamped() {
        let app = app(scenario(), MockValidatorSource::default());
        let uri = format!(
            "/api/address/txs?address={}&scanBlocks=99999999999999999999&limit=10000000000000000000",
            fixture_address(0xa)
        );
        let (status, body) = get_json(app.clone(), &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 3);

        let (status, body) = get_json(app, "/api/txs?limit=10000000000000000000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_rejected_query_is_json() {
        let (status, body) = get_json(
            app(scenario(), MockValidatorSource::default()),
            "/api/txs?limit=1&limit=2",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_input");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid query"));
    }

    #[tokio::test]
    async fn test_unknown_filter_is_400() {
        let uri = format!("/api/address/txs?address={}&filter=up", fixture_address(0xa));
        let (status, _) = get_json(app(scenario(), MockValidatorSource::default()), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_entities_are_404() {
        let storage = scenario().without_block(500);
        let app = app(storage, MockValidatorSource::default());

        let (status, body) = get_json(app.clone(), "/api/block/500").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Block not found");

        let uri = format!("/api/tx/{}", fixture_tx_hash(7, 7));
        let (status, body) = get_json(app.clone(), &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");

        let (status, _) = get_json(app, "/api/nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_block_detail() {
        let (status, body) =
            get_json(app(scenario(), MockValidatorSource::default()), "/api/block/999").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["number"], "999");
        assert_eq!(body["txs"].as_array().unwrap().len(), 2);
        assert!(body.get("parentHash").is_some());
    }

    #[tokio::test]
    async fn test_recent_and_block_listing() {
        let app = app(scenario(), MockValidatorSource::default());

        let (status, body) = get_json(app.clone(), "/api/txs?limit=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["nextCursorBlock"], "998");
        assert!(body["items"][0].get("direction").is_none());

        let (status, body) = get_json(app, "/api/blocks?limit=2&cursor=999").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["number"], "999");
        assert_eq!(body["items"][1]["number"], "998");
        assert_eq!(body["nextCursor"], "997");
    }

    #[tokio::test]
    async fn test_balance() {
        let a = fixture_address(0xa);
        let storage =
            scenario().with_balance(a, alloy_primitives::U256::from(1_500_000_000_000_000_000u64));
        let uri = format!("/api/address/{a}/balance");
        let (status, body) = get_json(app(storage, MockValidatorSource::default()), &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balanceWei"], "1500000000000000000");
        assert_eq!(body["balanceGen"], "1.5");
    }

    #[tokio::test]
    async fn test_batch_rejects_malformed_body() {
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/api/tx/batch")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) =
            send(app(scenario(), MockValidatorSource::default()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn test_batch_drops_invalid_hashes() {
        let body = json!({ "hashes": ["nope", fixture_tx_hash(1, 0).to_string()] });
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/api/tx/batch")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) =
            send(app(scenario(), MockValidatorSource::default()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["items"][0]["error"], "Transaction not found");
    }

    #[tokio::test]
    async fn test_validator_list() {
        let validators = [fixture_address(1), fixture_address(2)];
        let (status, body) = get_json(
            app(scenario(), MockValidatorSource::with_validators(&validators)),
            "/api/validators",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["epoch"]["activeValidatorsCount"], 2);
        assert_eq!(body["validators"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_validator_is_404() {
        let [known, unlisted] = [fixture_address(6), fixture_address(7)];
        let mut source = MockValidatorSource::with_validators(&[known]);
        source.details.insert(known, Value::Null);
        let app = app(scenario(), source);

        for v in [known, unlisted] {
            let (status, body) = get_json(app.clone(), &format!("/api/validators/{v}")).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{v}");
            assert_eq!(body["kind"], "not_found", "{v}");
            assert_eq!(body["error"], format!("Validator {v} not found"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_validator_gateway_page_is_503() {
        let v = fixture_address(1);
        let source = MockValidatorSource::with_validators(&[v]).with_gateway_failures(v, 10);
        let (status, body) =
            get_json(app(scenario(), source), &format!("/api/validators/{v}")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("rate-limited"));
        assert!(body["details"].as_str().unwrap().chars().count() <= 300);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline_is_503_timeout() {
        let storage = scenario().with_block_latency(1000, Duration::from_secs(60));
        let (status, body) =
            get_json(app(storage, MockValidatorSource::default()), "/api/txs").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "timeout");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_503() {
        let storage = scenario().with_failing_block(1000, FailureMode::Transport);
        let (status, body) =
            get_json(app(storage, MockValidatorSource::default()), "/api/blocks/latest").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Upstream node unavailable");
    }
}
