//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use order_service::client::{HttpUserClient, USER_SERVICE_EDGE};
use order_service::config::ServiceConfig;
use order_service::http::{order_router, HttpServer, OrderState};
use order_service::lifecycle::startup::{run_order_service, run_user_service, wire_order_service};
use order_service::resilience::{BreakerRegistry, CircuitBreaker};
use order_service::store::InMemoryOrderStore;
use order_service::Shutdown;

/// Start a programmable user backend on an ephemeral port.
///
/// `f` is called once per request and yields the status and JSON body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// JSON body the user subsystem returns for a user.
pub fn user_json(id: i64, name: &str, email: &str) -> String {
    format!(
        r#"{{"id":{id},"email":"{email}","name":"{name}","createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}}"#
    )
}

/// Config pointing the order service at `user_addr`.
pub fn order_config(user_addr: SocketAddr) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.user_service.base_url = format!("http://{user_addr}");
    config.user_service.request_timeout_ms = 2000;
    config.resilience.failure_threshold = 3;
    config.resilience.cool_down_ms = 300;
    config.resilience.call_timeout_ms = 250;
    config
}

/// Run the real user service on an ephemeral port.
pub async fn spawn_user_service(shutdown: &Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = run_user_service(ServiceConfig::default(), listener, &shutdown).await;
    });
    addr
}

/// Run the order service exactly as the binary does.
pub async fn spawn_order_service(
    config: ServiceConfig,
    shutdown: &Shutdown,
) -> (SocketAddr, mpsc::UnboundedSender<ServiceConfig>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = run_order_service(config, listener, rx, &shutdown).await;
    });
    (addr, tx)
}

/// Run the order routes with access to the breaker registry.
pub async fn spawn_order_stack(
    config: ServiceConfig,
    shutdown: &Shutdown,
) -> (SocketAddr, Arc<BreakerRegistry>, Arc<CircuitBreaker>) {
    let client = HttpUserClient::new(&config.user_service).unwrap();
    let components = wire_order_service(&config, Arc::new(InMemoryOrderStore::new()), Arc::new(client));
    let breaker = components.registry.get(USER_SERVICE_EDGE).unwrap();

    let router = order_router(
        OrderState {
            orders: components.service,
        },
        Duration::from_secs(config.listener.request_timeout_secs),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = HttpServer::new("order-service", router).run(listener, server_shutdown).await;
    });

    (addr, components.registry, breaker)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
