//! warp server exposing [`AltTextService`]
//!
//! One endpoint accepts `application/x-www-form-urlencoded` posts carrying
//! an `action` field and answers with a JSON [`Envelope`]. Service-level
//! failures travel inside a `200` envelope; only transport-level problems
//! (wrong path, wrong method, oversized or unreadable bodies) use other
//! status codes.

use crate::config::ServerConfig;
use crate::error::ServerError;
use alt_core::protocol::{AjaxForm, Envelope, ErrorCode};
use alt_store::{AltTextService, Credentials};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use warp::http::StatusCode;
use warp::path::FullPath;
use warp::{Filter, Rejection, Reply};

/// Build the request filter for `service`
///
/// # Errors
/// - `ServerError::InvalidPath` if the configured path is unusable
pub fn routes(
    service: AltTextService,
    config: &ServerConfig,
) -> Result<impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone, ServerError> {
    let expected = format!("/{}", config.segments()?.join("/"));

    let endpoint = warp::path::full()
        .and_then(move |full: FullPath| {
            let matches = full.as_str().trim_end_matches('/') == expected;
            async move {
                if matches {
                    Ok(())
                } else {
                    Err(warp::reject::not_found())
                }
            }
        })
        .untuple_one();

    let service = warp::any().map(move || service.clone());

    Ok(endpoint
        .and(warp::post())
        .and(warp::body::content_length_limit(config.max_body_bytes))
        .and(warp::body::form::<AjaxForm>())
        .and(service)
        .map(handle)
        .recover(recover)
        .with(warp::log::custom(log_request)))
}

fn handle(form: AjaxForm, service: AltTextService) -> warp::reply::Json {
    let credentials = form
        .nonce
        .clone()
        .map_or_else(Credentials::anonymous, Credentials::with_nonce);
    tracing::debug!(action = %form.action, "handling request");
    warp::reply::json(&service.handle(&credentials, form))
}

async fn recover(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request too large")
    } else {
        (StatusCode::BAD_REQUEST, "Malformed request")
    };
    let body = warp::reply::json(&Envelope::error(ErrorCode::InvalidRequest, message));
    Ok(warp::reply::with_status(body, status))
}

fn log_request(info: warp::log::Info<'_>) {
    tracing::info!(
        method = %info.method(),
        path = info.path(),
        status = info.status().as_u16(),
        elapsed = ?info.elapsed(),
        "request"
    );
}

/// Bind the listen socket and return the server future
///
/// The future completes once `shutdown` is cancelled and in-flight requests
/// have finished.
///
/// # Errors
/// - `ServerError::Bind` if the address is unavailable
/// - `ServerError::InvalidPath` if the configured path is unusable
pub fn bind(
    service: AltTextService,
    config: &ServerConfig,
    shutdown: CancellationToken,
) -> Result<(SocketAddr, impl Future<Output = ()>), ServerError> {
    let routes = routes(service, config)?;
    let addr = config.bind;
    let (local, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async move { shutdown.cancelled().await })
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!(addr = %local, path = %config.path, "alt text endpoint listening");
    Ok((local, server))
}

/// Serve until `shutdown` is cancelled
///
/// # Errors
/// - see [`bind`]
pub async fn serve(
    service: AltTextService,
    config: &ServerConfig,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let (_, server) = bind(service, config, shutdown)?;
    server.await;
    tracing::info!("alt text endpoint stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
pub async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(error) => {
                tracing::warn!(%error, "SIGTERM handler unavailable, waiting for ctrl-c only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
