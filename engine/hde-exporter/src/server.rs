//! HTTP endpoint serving the registry

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use warp::filters::BoxedFilter;
use warp::reply::WithHeader;
use warp::Filter;

use crate::error::Result;
use crate::registry::MetricsRegistry;

/// Prometheus text exposition format
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// `GET /<segments..>` answering with the rendered registry; anything else is
/// rejected, which warp turns into a 404
pub fn metrics_routes(
    registry: Arc<MetricsRegistry>,
    path_segments: &[String],
) -> BoxedFilter<(WithHeader<String>,)> {
    let path = path_segments
        .iter()
        .fold(warp::any().boxed(), |filter, segment| {
            filter.and(warp::path(segment.clone())).boxed()
        });

    path.and(warp::path::end())
        .and(warp::get())
        .map(move || {
            debug!("Serving metrics");
            warp::reply::with_header(registry.render(), "content-type", CONTENT_TYPE)
        })
        .boxed()
}

/// Bind the metrics endpoint on `addr`.
///
/// Returns the bound address and the server future, which completes once
/// `cancel` fires.
pub fn bind(
    registry: Arc<MetricsRegistry>,
    addr: SocketAddr,
    path_segments: &[String],
    cancel: CancellationToken,
) -> Result<(SocketAddr, impl Future<Output = ()> + Send + 'static)> {
    let routes = metrics_routes(registry, path_segments);
    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async move { cancel.cancelled().await })?;
    info!(address = %bound, path = %format!("/{}", path_segments.join("/")), "Starting server");
    Ok((bound, server))
}
