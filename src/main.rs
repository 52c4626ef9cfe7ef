use std::sync::Arc;

use sendqueue::config::load_config;
use sendqueue::queue::TerminationFlag;
use sendqueue::session::SessionRegistry;
use sendqueue::transport::start_websocket_server;
use sendqueue::utils::error::Result;
use sendqueue::utils::logging;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    logging::init(&config.logging.level);

    let termination = TerminationFlag::global().clone();
    let registry = Arc::new(SessionRegistry::new(
        config.session.max_sessions,
        termination.clone(),
    ));
    let addr = format!("{}:{}", config.server.host, config.server.port);

    tokio::select! {
        result = start_websocket_server(&addr, registry, config.session.clone()) => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("termination requested, abandoning queued messages");
            termination.set();
        }
    }
    Ok(())
}
