#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use estimate_tool::{EngineConfig, EstimateSnapshot, http_api, load_snapshot_from_json};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let addr: SocketAddr = std::env::var("ESTIMATE_TOOL_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let config = EngineConfig::load()?;
    let snapshot = match std::env::var("ESTIMATE_TOOL_SNAPSHOT") {
        Ok(path) => load_snapshot_from_json(path)?,
        Err(_) => EstimateSnapshot::default(),
    };

    println!("estimate-tool HTTP API listening on http://{addr}");
    http_api::serve(addr, snapshot, config).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
