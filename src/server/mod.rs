//! HTTP server exposing the AI routes and the todo store.

mod handlers;

pub use handlers::{PrioritiseRequest, SuggestRequest, TitleRequest, TodoListResponse};

use crate::ai::Generator;
use crate::error::ApiError;
use crate::store::TodoStore;
use axum::{
    Router,
    routing::{get, patch, post},
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<TodoStore>>,
    /// `None` when no model credential is configured.
    generator: Option<Arc<dyn Generator>>,
}

impl AppState {
    pub fn new(store: TodoStore, generator: Option<Arc<dyn Generator>>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            generator,
        }
    }

    pub fn generator(&self) -> Option<&Arc<dyn Generator>> {
        self.generator.as_ref()
    }

    pub fn ai_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Lock the store for the duration of one request.
    pub fn store(&self) -> Result<MutexGuard<'_, TodoStore>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::internal("todo store lock poisoned"))
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // AI routes
        .route("/api/ai/suggest", post(handlers::ai_suggest))
        .route("/api/ai/prioritise", post(handlers::ai_prioritise))
        // Todo routes
        .route(
            "/api/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route("/api/todos/stats", get(handlers::todo_stats))
        .route(
            "/api/todos/clear-completed",
            post(handlers::clear_completed),
        )
        .route(
            "/api/todos/{id}",
            patch(handlers::update_todo).delete(handlers::delete_todo),
        )
        .route("/api/todos/{id}/toggle", post(handlers::toggle_todo))
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle to a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal shutdown and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            error!("Server task ended abnormally: {}", e);
        }
    }
}

/// Bind `addr` and serve in a background task.
pub async fn start_server(state: AppState, addr: &str) -> anyhow::Result<ServerHandle> {
    let listener = TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;
    let app = build_router(state);

    info!("Server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Server shutting down");
            })
            .await
        {
            error!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr: bound_addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}
