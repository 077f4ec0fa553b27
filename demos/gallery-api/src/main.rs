mod error;
mod routes;
mod state;

use std::env;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Opening card gallery...");
    let gallery = kissune_cards::async_client::AsyncCardGalleryBuilder::from_env()
        .build()
        .await
        .expect("Failed to open card gallery");
    log::info!("Gallery ready.");

    let state = Arc::new(AppState { gallery });

    let app = Router::new()
        .route(
            "/api/cards",
            get(routes::cards::list_cards).post(routes::cards::create_card),
        )
        .route(
            "/api/cards/{id}",
            get(routes::cards::get_card)
                .patch(routes::cards::update_card)
                .delete(routes::cards::delete_card),
        )
        .route("/api/sync", get(routes::sync::get_sync))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = env::var("KISSUNE_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    log::info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
