//! Block Pause - A challenge-gated control for temporarily pausing blocking
//!
//! This is the main entry point for the block-pause application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use block_pause::{
    api::create_router,
    config::Config,
    controller::{Event, ToggleMachine},
    services::{LocalBackend, SystemClock},
    state::AppState,
    tasks::spawn_popup,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("block_pause={},tower_http=info", config.log_level()))
        .init();

    info!("Starting block-pause server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, pause={}min, code_length={}",
          config.host, config.port, config.disable_minutes, config.code_length);

    // Persisted blocking state and its resume alarm
    let backend = LocalBackend::open(config.state_file.clone(), config.disable_duration(), SystemClock)?;
    backend.resume_pending_alarm()?;

    // Start the popup event loop and render from the persisted state
    let (machine, events) = ToggleMachine::new(backend, SystemClock, config.machine_settings());
    let popup = spawn_popup(machine, events);
    let initial = popup.handle.dispatch(Event::Load).await.map_err(anyhow::Error::msg)?;
    info!("Initial view: {:?} \"{}\"", initial.phase, initial.button_label);

    let state = Arc::new(AppState::new(
        popup.handle.clone(),
        popup.view_rx.clone(),
        config.port,
        config.host.clone(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /toggle            - Press the pause/resume button");
    info!("  POST /challenge/input   - Type into the challenge field");
    info!("  POST /challenge/confirm - Submit the challenge");
    info!("  POST /challenge/key     - Key press in the challenge field");
    info!("  GET  /view              - Current popup view");
    info!("  GET  /status            - View plus server metadata");
    info!("  GET  /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    popup.task.abort();
    info!("Server shutdown complete");
    Ok(())
}
