use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use reel_studio::config::AppConfig;
use reel_studio::openai_client::OpenAiClient;
use reel_studio::pictory_client::PictoryClient;
use reel_studio::workflow::Orchestrator;
use reel_studio::{app, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        model = %config.openai.model,
        scene_count = config.scene_count,
        storyboard_timeout_secs = config.polling.storyboard.max_elapsed.as_secs(),
        render_timeout_secs = config.polling.render.max_elapsed.as_secs(),
        "Configuration loaded"
    );

    let pictory = match PictoryClient::new(&config.pictory) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build render provider client: {}", e);
            std::process::exit(1);
        }
    };

    let orchestrator = Orchestrator::new(Arc::new(OpenAiClient::new(&config.openai)), Arc::new(pictory))
        .with_scene_count(config.scene_count)
        .with_polling(config.polling.clone());

    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState {
        orchestrator: Arc::new(orchestrator),
        shutdown: shutdown.clone(),
        text_model: config.openai.model.clone(),
        render_api: config.pictory.base_url.clone(),
    });

    let listener = match tokio::net::TcpListener::bind(config.bind_addr()).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr(), e);
            std::process::exit(1);
        }
    };
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("listening on {}", addr);
    }

    let server = axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown));

    if let Err(e) = server.await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

// In-flight runs observe the cancelled token and finish with `Cancelled`
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown requested, cancelling in-flight runs");
    shutdown.cancel();
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "info,reel_studio=debug,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        // One object per line for log aggregation
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!("Reel studio starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Build mode: {}", if cfg!(debug_assertions) { "development" } else { "production" });
    tracing::info!("Log level: {}", log_level);

    Ok(())
}
