//! Composite Gateway entry point.
//!
//! ```text
//! client ──▶ gateway ──┬──▶ user management
//!                      ├──▶ event management
//!                      ├──▶ ticketing
//!                      └──▶ email trigger / publish (fire-and-forget)
//! ```

use composite_gateway::{AppConfig, AppState, gateway, logging};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }
    let _log_guard = logging::init_logging(&config);

    tracing::info!("Starting Composite Gateway in {} mode", env);
    tracing::info!(
        "Backends: users={} events={} tickets={}",
        config.backends.user_url,
        config.backends.event_url,
        config.backends.ticket_url
    );

    gateway::run_server(AppState::new(config)).await
}
