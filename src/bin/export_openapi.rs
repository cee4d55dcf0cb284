//! Export the gateway's OpenAPI document.
//!
//! Usage:
//!   cargo run --bin export_openapi > openapi.json
//!   cargo run --bin export_openapi -- --output docs/openapi.json

use anyhow::Context;
use composite_gateway::gateway::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI spec")?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--output") => {
            let path = args.get(2).context("--output needs a path")?;
            std::fs::write(path, &json).with_context(|| format!("Failed to write {}", path))?;
            eprintln!("OpenAPI spec exported to: {}", path);
        }
        _ => println!("{}", json),
    }
    Ok(())
}
