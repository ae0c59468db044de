//! Trusted reverse proxy handling.
//!
//! With `hops` trusted proxies in front of the server, the value each
//! proxy appended is the n-th from the right of the `X-Forwarded-*`
//! header. Values further left were supplied by the client and are not
//! trusted.

use axum::{
    body::Body,
    extract::State,
    http::{header::HOST, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Number of trusted proxy hops; 0 disables forwarded header handling.
#[derive(Debug, Clone, Copy)]
pub struct ProxyFix {
    /// Trusted hops.
    pub hops: usize,
}

/// Client-facing request details recovered from forwarded headers.
///
/// Inserted into the request extensions by [`proxy_fix`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedInfo {
    /// Original scheme (`http`/`https`).
    pub scheme: Option<String>,
    /// Original host.
    pub host: Option<String>,
    /// Client address.
    pub client_ip: Option<String>,
}

/// The value `hops` entries from the right of a comma-separated header.
///
/// Repeated header lines count as one list. Returns `None` when fewer
/// than `hops` values are present.
fn trusted_value(headers: &HeaderMap, name: &str, hops: usize) -> Option<String> {
    if hops == 0 {
        return None;
    }

    let values: Vec<&str> = headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .collect();

    if values.len() < hops {
        return None;
    }
    let value = values[values.len() - hops];
    (!value.is_empty()).then(|| value.to_string())
}

impl ProxyFix {
    /// Read the trusted forwarded values from `headers`.
    pub fn forwarded_info(&self, headers: &HeaderMap) -> ForwardedInfo {
        ForwardedInfo {
            scheme: trusted_value(headers, X_FORWARDED_PROTO, self.hops)
                .map(|s| s.to_ascii_lowercase()),
            host: trusted_value(headers, X_FORWARDED_HOST, self.hops),
            client_ip: trusted_value(headers, X_FORWARDED_FOR, self.hops),
        }
    }
}

/// Middleware applying the trusted forwarded headers to the request.
///
/// The `Host` header is replaced by the forwarded host.
pub async fn proxy_fix(
    State(fix): State<ProxyFix>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let info = fix.forwarded_info(req.headers());

    if let Some(host) = info.host.as_deref() {
        match HeaderValue::from_str(host) {
            Ok(value) => {
                req.headers_mut().insert(HOST, value);
            }
            Err(_) => tracing::debug!(host = %host, "Ignoring invalid forwarded host"),
        }
    }

    req.extensions_mut().insert(info);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension, Router};
    use tower::util::ServiceExt;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_one_hop_takes_rightmost() {
        let fix = ProxyFix { hops: 1 };
        let info = fix.forwarded_info(&headers(&[
            ("x-forwarded-for", "10.0.0.1, 203.0.113.7"),
            ("x-forwarded-proto", "HTTPS"),
            ("x-forwarded-host", "files.example.com"),
        ]));

        assert_eq!(info.client_ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.scheme.as_deref(), Some("https"));
        assert_eq!(info.host.as_deref(), Some("files.example.com"));
    }

    #[test]
    fn test_two_hops() {
        let fix = ProxyFix { hops: 2 };
        let info = fix.forwarded_info(&headers(&[
            ("x-forwarded-for", "1.1.1.1, 2.2.2.2, 3.3.3.3"),
            ("x-forwarded-proto", "https"),
        ]));

        assert_eq!(info.client_ip.as_deref(), Some("2.2.2.2"));
        // Only one proto value, fewer than the trusted hops
        assert!(info.scheme.is_none());
    }

    #[test]
    fn test_repeated_header_lines() {
        let fix = ProxyFix { hops: 1 };
        let info = fix.forwarded_info(&headers(&[
            ("x-forwarded-for", "1.1.1.1"),
            ("x-forwarded-for", "2.2.2.2"),
        ]));
        assert_eq!(info.client_ip.as_deref(), Some("2.2.2.2"));
    }

    #[test]
    fn test_disabled() {
        let fix = ProxyFix { hops: 0 };
        let info = fix.forwarded_info(&headers(&[("x-forwarded-for", "1.1.1.1")]));
        assert_eq!(info, ForwardedInfo::default());
    }

    #[tokio::test]
    async fn test_middleware_rewrites_host() {
        async fn show(Extension(info): Extension<ForwardedInfo>, headers: HeaderMap) -> String {
            format!(
                "{}|{}",
                headers.get(HOST).and_then(|h| h.to_str().ok()).unwrap_or(""),
                info.scheme.unwrap_or_default()
            )
        }

        let app = Router::new()
            .route("/", get(show))
            .layer(middleware::from_fn_with_state(ProxyFix { hops: 1 }, proxy_fix));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(HOST, "127.0.0.1:5000")
                    .header("x-forwarded-host", "files.example.com")
                    .header("x-forwarded-proto", "https")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"files.example.com|https");
    }
}
