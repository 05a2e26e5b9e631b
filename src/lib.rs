pub mod agent;
pub mod cli;
pub mod history;
pub mod llm;
pub mod models;
pub mod responder;
pub mod server;

#[cfg(test)]
mod test_support;

use agent::ChatAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr());
    info!("Response Mode: {}", args.response_mode);
    info!("LLM Providers: {}", args.llm_providers);
    info!("LLM Timeout (s): {}", args.llm_timeout_secs);
    info!("History Store Type: {}", args.history_type);
    info!("Database URL configured: {}", args.database_url.is_some());
    info!("SQLite Path: {}", args.sqlite_path);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let agent = ChatAgent::from_args(&args).await?;
    let addr = args.server_addr();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent, args);
    server.run().await?;

    Ok(())
}
