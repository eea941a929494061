/*
 * Responsibility
 * - Load Config, build the security gate and the shared state
 * - Assemble the Router: routes, security gate, CORS, HTTP layers
 * - Start the server with axum::serve()
 */
use std::{panic, process};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::auth::build_security_gate;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,gateway_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Fail fast outside production.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    if config.token.signing_secret.is_default() {
        tracing::warn!("using the built-in signing secret, set SECURITY_JWT_SECRET");
    }

    tracing::info!(
        "starting gateway in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let gate = build_security_gate(config)?;
    Ok(AppState::new(
        gate,
        config.access.entry_point,
        &config.access.login_path,
    ))
}

/// Full application router. The security gate sits inside the CORS and HTTP
/// layers, so preflight requests and access logs see every request.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(&config.access.login_path);
    let router = middleware::auth::access::apply(router, state.clone()).with_state(state);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config.http)
}
