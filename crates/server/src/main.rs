mod api;
mod dto;
mod notifications;
mod state;
mod upstream;

use crate::{notifications::QueueNotifier, state::AppState, upstream::HttpUpstream};
use axum::{
    Router,
    routing::{get, post},
};
use fleetboard::prelude::*;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{error, info};

const PORT: u32 = 3000;
const PUSH_BUFFER: usize = 16;
const NOTIFICATION_BUFFER: usize = 32;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let args: Vec<_> = std::env::args().collect();
    if args.len() < 3 {
        error!("Usage: fleetboard-server <company-id> <upstream-url>");
        std::process::exit(1);
    }
    let company_id = args[1].as_str();
    let upstream = HttpUpstream::new(args[2].as_str());
    let port = match std::env::var("PORT") {
        Ok(value) => match value.parse::<u32>() {
            Ok(port) => port,
            Err(err) => {
                error!("Invalid PORT {value}: {err}");
                std::process::exit(1);
            }
        },
        Err(_) => PORT,
    };

    let config = Config::new();
    let timeout = config.refresh_timeout;
    let notifications = Arc::new(QueueNotifier::new(NOTIFICATION_BUFFER));
    let controller = Arc::new(RefreshController::with_config(
        company_id,
        upstream.clone(),
        notifications.clone(),
        config,
    ));
    let (pushes, rx) = mpsc::channel(PUSH_BUFFER);
    let _subscription = controller.subscribe(rx);

    tokio::spawn({
        let controller = controller.clone();
        let pushes = pushes.clone();
        async move {
            info!("Loading company {}...", controller.company_id());
            let now = Instant::now();
            controller.resolve_company(&upstream).await;
            initial_push(&upstream, controller.company_id(), &pushes, timeout).await;
            info!("Loading data took {:?}", now.elapsed());
        }
    });

    let state = Arc::new(AppState {
        controller,
        pushes,
        notifications,
    });
    let app = build_router(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {port}: {err}");
            std::process::exit(1);
        }
    };
    info!("Listening to port {port}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server stopped: {err}");
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/dashboard", get(api::dashboard))
        .route("/refresh", post(api::refresh))
        .route("/buses/{bus_id}/toggle", post(api::toggle))
        .route("/push", post(api::push))
        .route("/notifications", get(api::notifications))
        .with_state(state)
}

/// Delivers the first snapshot through the push channel, as the record service would.
async fn initial_push<S: BusSource>(
    source: &S,
    company_id: &str,
    pushes: &mpsc::Sender<Push>,
    timeout: Duration,
) {
    let push = match tokio::time::timeout(timeout, source.fetch(company_id)).await {
        Ok(Ok(records)) => Push::Data(Some(records)),
        Ok(Err(err)) => Push::Error(err),
        Err(_) => {
            error!("First snapshot for {company_id} timed out after {timeout:?}");
            Push::Error(ErrorInfo::new(
                ErrorCode::Timeout,
                format!("Request timed out after {timeout:?}"),
            ))
        }
    };
    if pushes.send(push).await.is_err() {
        error!("Push channel closed before the first snapshot");
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
