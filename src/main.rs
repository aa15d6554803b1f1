use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lilhttp::{Config, Server, handlers};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::parse();
    match config.directory.as_deref() {
        Some(dir) => info!(directory = %dir.display(), "serving files"),
        None => info!("no --directory given, /files is disabled"),
    }

    let router = handlers::routes(config.directory.clone());

    let server = match Server::bind(config.address()).await {
        Ok(server) => server.with_options(config.server_options()),
        Err(e) => {
            error!(error = %e, "failed to start");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(router).await {
        error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
