use tokio::signal;

/// Resolves once the process has been asked to shut down (SIGINT or SIGTERM).
pub async fn shutdown() {
    tokio::select! {
        () = sigint() => {},
        () = sigterm() => {},
    }
}

async fn sigint() {
    match signal::ctrl_c().await {
        Ok(()) => tracing::warn!("received ctrl-c, shutting down"),
        Err(error) => {
            tracing::error!(%error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        },
    }
}

#[cfg(unix)]
async fn sigterm() {
    use tokio::signal::unix;

    match unix::signal(unix::SignalKind::terminate()) {
        Ok(mut signal) => match signal.recv().await {
            Some(()) => tracing::warn!("received SIGTERM, shutting down"),
            None => {
                tracing::error!("could not listen for more SIGTERM events");
                std::future::pending::<()>().await;
            },
        },
        Err(error) => {
            tracing::error!(%error, "failed to listen for SIGTERM");
            std::future::pending::<()>().await;
        },
    }
}

#[cfg(not(unix))]
async fn sigterm() {
    std::future::pending().await
}
