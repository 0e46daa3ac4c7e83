//src/main.rs

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;
    app_state.composers.spawn_idle_reaper(settings.composer_idle_timeout);

    let listener = TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app(app_state)).await?;

    Ok(())
}

pub fn app(app_state: AppState) -> Router {
    // Editor de peças do orçamento (rascunho ou orçamento já salvo)
    let composer_routes = Router::new()
        .route("/"
               ,post(handlers::quotes::open_composer)
        )
        .route("/{session_id}"
               ,get(handlers::quotes::get_composer)
               .delete(handlers::quotes::close_composer)
        )
        .route("/{session_id}/part"
               ,put(handlers::quotes::select_part)
        )
        .route("/{session_id}/inputs"
               ,put(handlers::quotes::update_inputs)
        )
        .route("/{session_id}/items"
               ,post(handlers::quotes::add_item)
        )
        .route("/{session_id}/items/{item_id}"
               ,axum::routing::delete(handlers::quotes::remove_item)
        );

    let work_order_routes = Router::new()
        .route("/"
               ,get(handlers::work_orders::list_work_orders)
        )
        .route("/{id}"
               ,get(handlers::work_orders::get_work_order_card)
               .delete(handlers::work_orders::delete_work_order)
        )
        .route("/{id}/view"
               ,post(handlers::work_orders::view_work_order)
        )
        .route("/{id}/edit"
               ,post(handlers::work_orders::edit_work_order)
        )
        .route("/{id}/delete-prompt"
               ,get(handlers::work_orders::get_delete_prompt)
        );

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/parts", get(handlers::catalog::list_parts))
        .nest("/api/quote-composers", composer_routes)
        .nest("/api/work-orders", work_order_routes)
        .with_state(app_state)
}
