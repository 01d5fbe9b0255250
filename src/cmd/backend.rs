//! `keygate backend`: run the sample movie backend.

use std::net::SocketAddr;

use crate::backend;
use crate::cli::BackendArgs;
use crate::error::KeygateError;
use crate::logging;
use crate::server;

pub async fn execute(args: BackendArgs) -> Result<(), KeygateError> {
    logging::init(&args.log_level, logging::resolve_format(false, false));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, context_path = %args.context_path, "movie backend started");

    axum::serve(listener, backend::router(&args.context_path))
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("movie backend stopped");
    Ok(())
}
