use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use term_lifecycle::dispatch::{BULK_ACTION, ROW_ACTION, TOGGLE_STATUS_ACTION};
use term_lifecycle::{
    AppState, CommandDispatcher, EngineConfig, EntityStore, Kind, MemoryAuthority,
    MemoryEntityStore, TermEngine, build_router,
};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "term-lifecycle")]
#[command(about = "Admin command server for category, tag and ribbon status lifecycles")]
struct Cli {
    /// Listen address, overrides TERM_LIFECYCLE_BIND
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// JSON snapshot loaded at start and written on shutdown
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Ignore pre-migration metadata keys
    #[arg(long)]
    no_legacy_fallback: bool,

    /// Administrator allowed to manage every kind
    #[arg(long, default_value = "admin")]
    admin: String,

    /// Create a few demo terms when the store is empty
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = EngineConfig::from_env()
        .map_err(|e| anyhow!(e))
        .context("failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config = config.bind(bind);
    }
    if let Some(path) = cli.snapshot {
        config = config.snapshot_path(path);
    }
    if cli.no_legacy_fallback {
        config = config.legacy_fallback(false);
    }

    let store = match &config.snapshot_path {
        Some(path) => MemoryEntityStore::load_snapshot(path)
            .await
            .with_context(|| format!("failed to load snapshot {}", path.display()))?,
        None => MemoryEntityStore::new(),
    };
    let store = Arc::new(store);
    let shared: Arc<dyn EntityStore> = store.clone();

    let engine = TermEngine::with_store(shared.clone(), &config);
    if cli.seed {
        seed(&store, &engine).await?;
    }

    let authority = Arc::new(MemoryAuthority::with_admin(&cli.admin));
    for kind in Kind::ALL {
        for action in [TOGGLE_STATUS_ACTION, ROW_ACTION, BULK_ACTION] {
            let token_action = CommandDispatcher::token_action(kind, action);
            let token = authority.issue_token(&token_action).await;
            debug!(action = %token_action, %token, "issued request token");
        }
    }
    info!(user = %cli.admin, "request tokens issued");

    let dispatcher = CommandDispatcher::new(engine, authority);
    let app = build_router(AppState::new(dispatcher, shared));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind))?;
    info!(address = %config.bind, legacy_fallback = config.legacy_fallback, "term lifecycle server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(path) = &config.snapshot_path {
        store
            .save_snapshot(path)
            .await
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
    }

    Ok(())
}

async fn seed(store: &MemoryEntityStore, engine: &TermEngine) -> Result<()> {
    const NAMES: [&str; 3] = ["General", "Featured", "Archive"];

    for kind in Kind::ALL {
        if store.len(kind).await > 0 {
            continue;
        }
        let mut ids = Vec::new();
        for name in NAMES {
            ids.push(store.create(kind, name).await?);
        }
        if let Some(first) = ids.first() {
            engine.defaults.promote_to_default(kind, *first).await?;
        }
        info!(%kind, count = ids.len(), "seeded demo terms");
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("term_lifecycle=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
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
}
