use ai_interviewer::camera::{CameraBackendConfig, CameraSource};
use ai_interviewer::{create_router, AppState, Config, GeminiProvider, SessionConfig};
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "ai-interviewer", about = "AI-driven mock video interview service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/ai-interviewer")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let provider = Arc::new(GeminiProvider::from_env(&cfg.chat)?);

    let template = SessionConfig {
        camera_source: CameraSource::Device(cfg.camera.device_index),
        camera: CameraBackendConfig {
            width: cfg.camera.width,
            height: cfg.camera.height,
            fps: cfg.camera.fps,
            ..CameraBackendConfig::default()
        },
        system_instruction: cfg.chat.system_instruction.clone(),
        ..SessionConfig::default()
    };

    let state = AppState::new(provider, template);
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
