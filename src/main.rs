use axum::Router;
use axum::middleware::from_fn_with_state;
use log::info;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod auth;
mod error;
mod integration;
mod message;
mod schema;
mod state;
mod thread;
mod user;

use error::{Error, Result};

#[tokio::main]
async fn main() {
    let cfg = integration::Config::default();

    let state = AppState::init(&cfg).expect("Failed to initialize app state");

    let app = app(state)
        .layer(
            CorsLayer::new()
                .allow_origin(cfg.env.allow_origin())
                .allow_methods(cfg.env.allow_methods())
                .allow_headers(cfg.env.allow_headers()),
        )
        .layer(TraceLayer::new_for_http());

    let addr = cfg.env.addr();
    info!("Listening on {addr}");

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .expect("Failed to start server");
}

fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(thread::api(state.clone()))
        .merge(message::api(state.clone()))
        .route_layer(from_fn_with_state(
            state.clone(),
            auth::middleware::authorize,
        ));

    let public = Router::new()
        .merge(user::api(state.clone()))
        .merge(auth::api(state));

    Router::new().nest("/api", protected.merge(public))
}
