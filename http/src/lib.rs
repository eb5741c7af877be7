#[macro_use]
extern crate tracing;

pub mod error;
pub mod router;

pub use error::ServerError;
pub use router::create_router;
use std::future::Future;
use tokio::net::TcpListener;

/// Serves `router` until `shutdown` resolves. In-flight scrapes are allowed to finish.
pub async fn serve<F>(listener: TcpListener, router: axum::Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(address) = listener.local_addr() {
        info!("listening on {address}");
    }
    axum::serve(listener, router).with_graceful_shutdown(shutdown).await
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}
