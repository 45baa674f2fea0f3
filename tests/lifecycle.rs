use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use todo_service::{
    build_app, serve_with_shutdown, AppConfig, AppState, NewTodo, Todo, TodoId, TodoStore,
    Validator,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceExt;

/// Sets its flag when dropped, i.e. when the owning future is cancelled.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// A store whose list never finishes on its own.
#[derive(Default)]
struct StalledStore {
    started: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

#[async_trait::async_trait]
impl TodoStore for StalledStore {
    async fn get_todo(&self, _id: TodoId) -> Result<Option<Todo>> {
        Ok(None)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>> {
        let _flag = DropFlag(self.cancelled.clone());
        self.started.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }

    async fn create_todo(&self, _todo: NewTodo) -> Result<TodoId> {
        Ok(1)
    }

    async fn update_todo(&self, _id: TodoId, _todo: NewTodo) -> Result<bool> {
        Ok(false)
    }

    async fn delete_todo(&self, _id: TodoId) -> Result<bool> {
        Ok(false)
    }
}

async fn wait_for(flag: &AtomicBool) {
    for _ in 0..500 {
        if flag.load(Ordering::SeqCst) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("flag was never set");
}

#[tokio::test]
async fn slow_request_times_out_and_cancels_the_store_call() {
    let store = Arc::new(StalledStore::default());
    let mut config = AppConfig::default();
    config.server.request_timeout_secs = 1;
    let app = build_app(AppState::new(store.clone(), Validator), &config);

    let started = Instant::now();
    let response = app
        .oneshot(Request::get("/todos").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(store.started.load(Ordering::SeqCst));
    assert!(store.cancelled.load(Ordering::SeqCst));
}

#[tokio::test]
async fn idle_server_stops_promptly_on_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(
        AppState::new(Arc::new(StalledStore::default()), Validator),
        &AppConfig::default(),
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve_with_shutdown(
        listener,
        app,
        Duration::from_secs(30),
        async {
            let _ = shutdown_rx.await;
        },
    ));

    let health = reqwest::get(format!("http://{addr}/healthz"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(health, "OK");

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn shutdown_gives_up_after_the_grace_period() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let store = Arc::new(StalledStore::default());
    let app = build_app(
        AppState::new(store.clone(), Validator),
        &AppConfig::default(),
    );

    let grace = Duration::from_millis(300);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve_with_shutdown(listener, app, grace, async {
        let _ = shutdown_rx.await;
    }));

    let in_flight = tokio::spawn(async move { reqwest::get(format!("http://{addr}/todos")).await });
    wait_for(&store.started).await;

    let signalled = Instant::now();
    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server ignored the grace period")
        .unwrap()
        .unwrap();

    assert!(signalled.elapsed() >= grace);
    in_flight.abort();
}
