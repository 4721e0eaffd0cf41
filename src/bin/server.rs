//! MiniDB - Demo Web Server

use std::env;

use anyhow::Result;
use minidb::executor::Executor;
use minidb::server::{Server, ServerConfig};
use minidb::storage::Database;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = ServerConfig::new();
    let mut data_dir = "webapp_db".to_string();

    // Simple argument parsing
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if let Some(port) = args.get(i + 1).and_then(|s| s.parse().ok()) {
                    config = config.port(port);
                }
                i += 2;
            }
            "--data-dir" | "-d" => {
                if let Some(dir) = args.get(i + 1) {
                    data_dir = dir.clone();
                }
                i += 2;
            }
            _ => i += 1,
        }
    }

    let db = Database::open(&data_dir)?;
    let server = Server::new(config, Executor::new(db));
    server.bootstrap();
    server.start()?;

    Ok(())
}
