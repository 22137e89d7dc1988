use log::error;

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
pub async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("❌ Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
