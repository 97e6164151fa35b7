//! End-to-end tests against the real user service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use order_service::admin::{setup_admin_router, AdminState};
use order_service::http::HttpServer;
use order_service::Shutdown;

mod common;

#[tokio::test]
async fn test_orders_enriched_with_real_user() {
    let shutdown = Shutdown::new();
    let user_addr = common::spawn_user_service(&shutdown).await;
    let (order_addr, _updates) = common::spawn_order_service(common::order_config(user_addr), &shutdown).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = common::http_client();
    let res = client
        .post(format!("http://{user_addr}/api/users"))
        .json(&json!({ "email": "grace@example.com", "name": "Grace Hopper" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let user: Value = res.json().await.unwrap();
    let user_id = user["id"].as_i64().unwrap();

    for product in ["Compiler", "Debugger"] {
        let res = client
            .post(format!("http://{order_addr}/orders"))
            .json(&json!({
                "userId": user_id,
                "productName": product,
                "quantity": 1,
                "price": 12.5,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);
        let order: Value = res.json().await.unwrap();
        assert_eq!(order["userName"], "Grace Hopper");
        assert_eq!(order["userEmail"], "grace@example.com");
    }

    let res = client
        .get(format!("http://{order_addr}/orders?userId={user_id}"))
        .send()
        .await
        .unwrap();
    let orders: Vec<Value> = res.json().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o["userName"] == "Grace Hopper"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_user_gets_sentinel_but_breaker_stays_closed() {
    let shutdown = Shutdown::new();
    let user_addr = common::spawn_user_service(&shutdown).await;
    let (order_addr, _registry, breaker) =
        common::spawn_order_stack(common::order_config(user_addr), &shutdown).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = common::http_client();
    for _ in 0..5 {
        let res = client
            .post(format!("http://{order_addr}/orders"))
            .json(&json!({ "userId": 999, "productName": "Ghost", "quantity": 1, "price": "1" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);
        let order: Value = res.json().await.unwrap();
        assert_eq!(order["userName"], "Unknown User");
    }

    assert_eq!(breaker.state(), order_service::resilience::CircuitState::Closed);
    assert_eq!(breaker.consecutive_failures(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_admin_breaker_inspection_and_reset() {
    let user_addr = common::start_programmable_backend(|| async { (503, "{}".into()) }).await;

    let mut config = common::order_config(user_addr);
    config.resilience.cool_down_ms = 60_000;
    let shutdown = Shutdown::new();
    let (order_addr, registry, _breaker) = common::spawn_order_stack(config, &shutdown).await;

    let admin_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let admin_addr = admin_listener.local_addr().unwrap();
    let admin = setup_admin_router(AdminState {
        registry,
        api_key: Arc::from("test-key"),
    });
    let admin_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = HttpServer::new("admin", admin).run(admin_listener, admin_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = common::http_client();
    for _ in 0..3 {
        client
            .get(format!("http://{order_addr}/orders?userId=1"))
            .send()
            .await
            .unwrap();
    }

    let res = client
        .get(format!("http://{admin_addr}/admin/breakers"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(format!("http://{admin_addr}/admin/breakers"))
        .bearer_auth("test-key")
        .send()
        .await
        .unwrap();
    let breakers: Vec<Value> = res.json().await.unwrap();
    assert_eq!(breakers.len(), 1);
    assert_eq!(breakers[0]["name"], "user-service");
    assert_eq!(breakers[0]["state"], "OPEN");

    let res = client
        .post(format!("http://{admin_addr}/admin/breakers/user-service/reset"))
        .bearer_auth("test-key")
        .send()
        .await
        .unwrap();
    let snapshot: Value = res.json().await.unwrap();
    assert_eq!(snapshot["state"], "CLOSED");
    assert_eq!(snapshot["consecutiveFailures"], 0);

    let res = client
        .post(format!("http://{admin_addr}/admin/breakers/nope/reset"))
        .bearer_auth("test-key")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}
