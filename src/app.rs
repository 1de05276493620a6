use std::{net::SocketAddr, time::Duration};

use axum::{
    http::{Request, Response, StatusCode},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{field, info, info_span, warn, Span};

use crate::{config::AppConfig, state::AppState, students};

pub fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .merge(students::router())
        .route("/health", get(|| async { "ok" }));

    Router::new()
        .nest("/api/v1", api)
        .fallback(|| async { (StatusCode::NOT_FOUND, "no such route") })
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    info_span!(
                        "request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        status = field::Empty,
                        latency_ms = field::Empty,
                    )
                })
                .on_response(|res: &Response<_>, latency: Duration, span: &Span| {
                    let status = res.status();
                    span.record("status", status.as_u16());
                    span.record("latency_ms", latency.as_millis() as u64);
                    if status.is_server_error() {
                        tracing::error!(%status, "request failed");
                    } else {
                        tracing::debug!(%status, "request finished");
                    }
                }),
        )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
