//! Client identification utilities
//!
//! Resolves a stable client identifier for rate limiting from request headers.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Shared identity for callers whose address cannot be determined
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Extract client IP address from headers
///
/// Priority chain:
/// 1. first entry of `X-Forwarded-For` (reverse proxy setups)
/// 2. `X-Real-IP`
/// 3. direct connection IP
///
/// Entries that do not parse as an IP address are skipped.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());
    if forwarded.is_some() {
        return forwarded;
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());
    if real_ip.is_some() {
        return real_ip;
    }

    direct_ip
}

/// Resolve the rate-limit identity of a caller
///
/// Falls back to [`UNKNOWN_CLIENT`], so every unidentifiable caller shares
/// one bucket.
pub fn resolve_client_id(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> String {
    extract_client_ip(headers, direct_ip)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.9.9.9"));

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.9.9.9"));
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some("10.9.9.9".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_skips_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        assert_eq!(extract_client_ip(&headers, Some(direct)), Some(direct));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let headers = HeaderMap::new();
        let direct: IpAddr = "::1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }

    #[test]
    fn test_resolve_client_id_sentinel() {
        let headers = HeaderMap::new();
        assert_eq!(resolve_client_id(&headers, None), UNKNOWN_CLIENT);
    }
}
