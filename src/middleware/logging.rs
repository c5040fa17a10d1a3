use axum::{extract::Request, middleware::Next, response::Response};

use super::ip::{extract_ip_from_headers, MaybeRemoteAddr};

/// Logs one line per request before handing it on.
pub async fn log_request(MaybeRemoteAddr(peer): MaybeRemoteAddr, req: Request, next: Next) -> Response {
    let client_ip = extract_ip_from_headers(req.headers(), peer.map(|addr| addr.ip()));
    tracing::info!(
        remote_addr = ?peer,
        client_ip = ?client_ip,
        proto = ?req.version(),
        method = %req.method(),
        uri = %req.uri(),
        "request"
    );
    next.run(req).await
}
