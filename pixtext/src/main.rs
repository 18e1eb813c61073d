use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixtext::api::{create_router, AppState};
use pixtext::config::Config;
use pixtext::ocr::EngineHandle;

#[derive(Parser)]
#[command(name = "pixtext")]
#[command(about = "Image-to-text extraction over HTTP")]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Start initializing the OCR engine at boot instead of on first request
    #[arg(long)]
    warmup: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pixtext=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let mut config = Config::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!(
        engine = %config.ocr.engine,
        languages = %config.ocr.languages,
        max_dimension = config.ocr.max_image_dimension,
        quality = config.ocr.reencode_quality,
        join_policy = %config.ocr.join_policy,
        "OCR configuration loaded"
    );

    let engine = EngineHandle::from_config(&config.ocr);
    if args.warmup || config.ocr.warmup {
        tracing::info!("Warming up OCR engine in the background...");
        engine.warm_up();
    } else {
        tracing::info!("OCR engine will initialize on first request");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, engine);
    let app = create_router(state);

    tracing::info!("pixtext starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  Upload:       POST http://{}/upload", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests...");
}
