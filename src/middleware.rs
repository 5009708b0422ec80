use super::errors::ServerError;
use axum::{
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// API responses reflect the store at request time; never let a browser or
/// proxy serve a stale copy.
pub async fn no_store<B>(
    request: Request<B>,
    next: Next<B>,
) -> Result<Response, ServerError> {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(response)
}
