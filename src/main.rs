//! Outfitter - Dimension-Constrained Look Generation Service
//! Mission: Coherent outfits around any anchor product, under 100ms

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use outfitter_backend::{
    api::{self, AppState},
    catalog::{EdgeStore, ProductStore, SqliteCatalog},
    AppConfig, LookService,
};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "outfitter_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    init_tracing();

    info!("👔 Outfitter look service starting");

    let catalog = Arc::new(
        SqliteCatalog::new(&config.database_path)
            .with_context(|| format!("Failed to open catalog at {}", config.database_path))?,
    );
    info!(
        "📦 Catalog initialized at: {} ({} products)",
        config.database_path,
        catalog.product_count().unwrap_or(0)
    );

    let products: Arc<dyn ProductStore> = catalog.clone();
    let edges: Arc<dyn EdgeStore> = catalog;
    let service = Arc::new(LookService::new(products, edges, config.looks.clone()));

    let app = api::router(AppState { looks: service })
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
