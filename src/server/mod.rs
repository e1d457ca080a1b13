use crate::config::Config;
use crate::screenshot::ScreenshotClient;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use clipserve_av::{Fetcher, FetchOptions, ProcessRunner, SystemRunner, Workdir};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod error;
pub mod multipart;
pub mod routes_media;

pub use error::ApiError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Subprocess boundary; swapped for a stub in tests.
    pub runner: Arc<dyn ProcessRunner>,
    pub fetcher: Arc<Fetcher>,
    /// Scratch space for downloads and intermediate transforms.
    pub tmp: Workdir,
    /// Root for slug-named snapshot directories.
    pub snapshots: Workdir,
    /// Publicly served output directory.
    pub output: Workdir,
    /// Remote-screenshot fallback, when configured.
    pub screenshots: Option<Arc<ScreenshotClient>>,
}

impl AppContext {
    /// Build a context with the given runner, creating the working
    /// directories up front.
    pub fn new(config: Config, runner: Arc<dyn ProcessRunner>) -> Result<Self> {
        let tmp = Workdir::new(&config.media.tmp_dir)
            .with_context(|| format!("Failed to create tmp dir {:?}", config.media.tmp_dir))?;
        let snapshots = Workdir::new(&config.media.snapshot_dir).with_context(|| {
            format!("Failed to create snapshot dir {:?}", config.media.snapshot_dir)
        })?;
        let output = Workdir::new(&config.media.output_dir).with_context(|| {
            format!("Failed to create output dir {:?}", config.media.output_dir)
        })?;

        let fetcher = Arc::new(Fetcher::new(
            runner.clone(),
            FetchOptions {
                cookies_file: config.fetch.cookies_file.clone(),
                require_credentials: config.fetch.require_credentials,
            },
        ));

        let screenshots = config
            .screenshot
            .as_ref()
            .map(ScreenshotClient::new)
            .transpose()?
            .map(Arc::new);

        Ok(Self {
            config: Arc::new(config),
            runner,
            fetcher,
            tmp,
            snapshots,
            output,
            screenshots,
        })
    }

    /// Build a context with the real subprocess runner.
    pub fn with_system_runner(config: Config) -> Result<Self> {
        let runner: Arc<dyn ProcessRunner> = match config.tools.process_timeout_secs {
            0 => Arc::new(SystemRunner::new()),
            secs => Arc::new(SystemRunner::with_timeout(Duration::from_secs(secs))),
        };
        Self::new(config, runner)
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let output_dir = ctx.output.root().to_path_buf();

    Router::new()
        .route("/", get(routes_media::root))
        .route("/health", get(routes_media::health))
        .route("/snapshots", post(routes_media::snapshots))
        .route("/clip", post(routes_media::clip))
        .route("/duration", post(routes_media::duration))
        .route("/trim-video", post(routes_media::trim_video))
        .route("/mute-video", post(routes_media::mute_video))
        .route("/stitch-videos", post(routes_media::stitch_videos))
        .nest_service("/output", ServeDir::new(output_dir))
        // Media uploads far exceed axum's 2 MB default body cap
        .layer(DefaultBodyLimit::max(ctx.config.server.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Start the HTTP server
pub async fn start_server(ctx: AppContext) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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

    tracing::info!("Shutdown signal received");
}
