use alloy_primitives::{Address, B256, U256};
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use covault_core::application::{AccountService, TransferOrchestrator};
use covault_core::infrastructure::clients::{ClientBundle, ClientRegistry};
use covault_core::infrastructure::config::{default_app_config, AppConfig, ChainRegistry, ResolverScheme};
use covault_core::infrastructure::relay::ScriptedRelay;
use covault_core::infrastructure::rpc::StaticChainRpc;
use covault_core::infrastructure::signing::ScriptedSigningNetwork;
use covault_service::api::{build_router, AppState, RateLimiter};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

fn addr20(byte: u8) -> Address {
    Address::from([byte; 20])
}

fn test_config() -> AppConfig {
    let mut config = default_app_config();
    for chain in config.chains.values_mut() {
        chain.execution_rpc_url = "https://execution.example".to_string();
        chain.coordinator_rpc_url = "https://coordinator.example".to_string();
        chain.bundler_rpc_url = "https://bundler.example".to_string();
        chain.factory_address = addr20(0xFA);
        chain.proxy_init_code_hash = B256::from([0x11; 32]);
        chain.entry_point = addr20(0xEF);
        chain.resolver = ResolverScheme::Child;
    }
    config
}

struct TestService {
    router: Router,
    rpc: Arc<StaticChainRpc>,
}

async fn service_with_key(api_key: Option<&str>) -> TestService {
    let config = test_config();
    let registry = Arc::new(ChainRegistry::from_config(&config).expect("registry"));

    let rpc = Arc::new(StaticChainRpc::new());
    rpc.set_cohort(addr20(0xEE), vec![addr20(1), addr20(2), addr20(3)], 2);
    rpc.set_base_fee(U256::from(50_000_000u64));
    let signing = Arc::new(ScriptedSigningNetwork::new(vec![], 2));
    let relay = Arc::new(ScriptedRelay::new());

    let clients = Arc::new(ClientRegistry::new(config.rpc.clone()));
    let bundle = ClientBundle {
        execution: rpc.clone(),
        execution_reader: rpc.clone(),
        coordinator: rpc.clone(),
        signing,
        relay,
    };
    clients.insert("base-sepolia", bundle.clone()).await;
    clients.insert("eth-sepolia", bundle).await;

    let state = Arc::new(AppState {
        accounts: Arc::new(AccountService::new(registry.clone(), clients.clone())),
        orchestrator: Arc::new(TransferOrchestrator::new(registry, clients)),
        api_key: api_key.map(|k| k.to_string()),
        rate_limiter: Arc::new(RateLimiter::new()),
        rate_limit_rps: 30,
        rate_limit_burst: 60,
    });

    TestService { router: build_router(state), rpc }
}

async fn call(
    router: &Router,
    method: &str,
    path: &str,
    api_key: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(path).header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    let body = match body {
        Some(value) => Body::from(serde_json::to_string(&value).expect("serialize body")),
        None => Body::empty(),
    };
    let mut request = builder.body(body).expect("request");
    request.extensions_mut().insert(ConnectInfo("127.0.0.1:10001".parse::<std::net::SocketAddr>().expect("addr")));

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn execute_body() -> serde_json::Value {
    json!({
        "userId": "alice",
        "to": "0x000000000000000000000000000000000000bEEF",
        "amountEth": "0.01",
        "discordTimestamp": 1_700_000_000u64,
        "discordSignature": "0xab12",
        "discordPayload": {"type": 2},
    })
}

#[tokio::test]
async fn health_is_open_and_reports_timestamp() {
    let service = service_with_key(Some("secret")).await;
    let (status, body) = call(&service.router, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().expect("timestamp").ends_with('Z'));
}

#[tokio::test]
async fn protected_routes_require_api_key() {
    let service = service_with_key(Some("secret")).await;

    let (status, body) =
        call(&service.router, "POST", "/v1/account", None, Some(json!({"userId": "alice"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().expect("error").contains("API Key"));

    let (status, _) =
        call(&service.router, "POST", "/v1/account", Some("wrong"), Some(json!({"userId": "alice"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        call(&service.router, "POST", "/v1/account", Some("secret"), Some(json!({"userId": "alice"}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn account_requires_user_id() {
    let service = service_with_key(None).await;
    let (status, body) = call(&service.router, "POST", "/v1/account", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("userId"));
}

#[tokio::test]
async fn account_derivation_is_stable_across_requests() {
    let service = service_with_key(None).await;

    let (status, first) =
        call(&service.router, "POST", "/v1/account", None, Some(json!({"userId": "alice"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["threshold"], 2);
    assert_eq!(first["deployed"], false);
    let address = first["address"].as_str().expect("address").to_string();
    assert!(address.starts_with("0x"));

    let (_, second) = call(&service.router, "POST", "/v1/account", None, Some(json!({"userId": "alice"}))).await;
    assert_eq!(second["address"].as_str().expect("address"), address);

    let (_, other) = call(&service.router, "POST", "/v1/account", None, Some(json!({"userId": "bob"}))).await;
    assert_ne!(other["address"].as_str().expect("address"), address);
}

#[tokio::test]
async fn balance_formats_ether() {
    let service = service_with_key(None).await;
    let holder = addr20(0xAB);
    service.rpc.set_balance(holder, U256::from(10_000_000_000_000_000u64));

    let path = format!("/v1/account/{holder}/balance");
    let (status, body) = call(&service.router, "GET", &path, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "0.01");
    assert_eq!(body["symbol"], "ETH");

    let (status, body) = call(&service.router, "GET", "/v1/account/nonsense/balance", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("address"));
}

#[tokio::test]
async fn execute_validates_required_fields() {
    let service = service_with_key(None).await;
    let mut body = execute_body();
    body.as_object_mut().expect("object").remove("discordSignature");

    let (status, reply) = call(&service.router, "POST", "/v1/execute", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(reply["error"].as_str().expect("error").contains("discordSignature"));
}

#[tokio::test]
async fn execute_submits_and_settles() {
    let service = service_with_key(None).await;

    let (status, reply) = call(&service.router, "POST", "/v1/execute", None, Some(execute_body())).await;
    assert_eq!(status, StatusCode::OK, "body: {reply}");
    assert_eq!(reply["status"], "submitted");
    assert_eq!(reply["amountEth"], "0.01");
    assert_eq!(reply["receiver"], "0x000000000000000000000000000000000000beef");
    assert!(reply["userOpHash"].as_str().expect("userOpHash").starts_with("0x"));
    assert!(reply["transactionHash"].as_str().expect("transactionHash").starts_with("0x"));

    // The sender must be the derived account for the same user.
    let (_, account) = call(&service.router, "POST", "/v1/account", None, Some(json!({"userId": "alice"}))).await;
    assert_eq!(reply["senderSmartAccount"], account["address"]);
}

#[tokio::test]
async fn execute_accepts_chain_label_alias() {
    let service = service_with_key(None).await;
    let mut body = execute_body();
    body["chain"] = json!("Base Sepolia");

    let (status, reply) = call(&service.router, "POST", "/v1/execute", None, Some(body)).await;
    assert_eq!(status, StatusCode::OK, "body: {reply}");
    assert_eq!(reply["status"], "submitted");
}
