//! Client identification, in precedence order.

use std::net::IpAddr;

use http::Request;

/// Inserted into request extensions by an upstream auth layer. Its
/// presence takes precedence over every other identification method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal(pub String);

/// Inserted into request extensions by the connection layer (mirroring
/// axum's `ConnectInfo`). Used as the identification method of last
/// resort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

const API_KEY_HEADER: &str = "x-api-key";

/// Resolves the stable identity used to key rate-limiter state, per the
/// precedence: authenticated principal, then a truncated API key, then
/// the observed IP.
pub fn resolve_client_id<B>(req: &Request<B>) -> String {
    if let Some(principal) = req.extensions().get::<AuthenticatedPrincipal>() {
        return principal.0.clone();
    }

    if let Some(api_key) = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        let truncated: String = api_key.chars().take(8).collect();
        return format!("api_key:{truncated}");
    }

    if let Some(ip) = req.extensions().get::<ClientIp>() {
        return format!("ip:{}", ip.0);
    }

    "ip:unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request<()> {
        Request::builder().uri("/x").body(()).unwrap()
    }

    #[test]
    fn authenticated_principal_takes_precedence() {
        let mut req = request();
        req.extensions_mut()
            .insert(AuthenticatedPrincipal("user-42".to_string()));
        req.extensions_mut()
            .insert(ClientIp("10.0.0.1".parse().unwrap()));
        assert_eq!(resolve_client_id(&req), "user-42");
    }

    #[test]
    fn api_key_is_truncated_to_eight_chars_and_prefixed() {
        let mut req = request();
        req.headers_mut()
            .insert(API_KEY_HEADER, "abcdefghijklmnop".parse().unwrap());
        assert_eq!(resolve_client_id(&req), "api_key:abcdefgh");
    }

    #[test]
    fn falls_back_to_client_ip() {
        let mut req = request();
        req.extensions_mut()
            .insert(ClientIp("203.0.113.9".parse().unwrap()));
        assert_eq!(resolve_client_id(&req), "ip:203.0.113.9");
    }

    #[test]
    fn falls_back_to_unknown_with_nothing_present() {
        let req = request();
        assert_eq!(resolve_client_id(&req), "ip:unknown");
    }
}
