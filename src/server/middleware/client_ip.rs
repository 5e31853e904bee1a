//! Caller address extraction.
//!
//! The verify endpoint binds tokens to a client IP. The IP the caller declares in the body
//! wins; otherwise the first `X-Forwarded-For` entry is used, then the TCP peer address.

use std::{
    convert::Infallible,
    net::{IpAddr, SocketAddr},
};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Addresses observed for the current request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientAddress {
    /// First entry of `X-Forwarded-For`, trimmed; `None` when absent or blank.
    pub forwarded_for: Option<String>,
    /// Address of the TCP peer when the server was started with connect info.
    pub peer: Option<IpAddr>,
}

impl ClientAddress {
    /// Picks the client IP for a claim.
    ///
    /// # Arguments
    /// - `declared` - `clientIp` from the request body
    ///
    /// # Returns
    /// - `Some(ip)` - First non-blank of declared, forwarded, peer
    /// - `None` - No address could be determined
    pub fn resolve(&self, declared: Option<String>) -> Option<String> {
        declared
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty())
            .or_else(|| self.forwarded_for.clone())
            .or_else(|| self.peer.map(|ip| ip.to_canonical().to_string()))
    }
}

fn first_forwarded(header: &str) -> Option<String> {
    header
        .split(',')
        .next()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for ClientAddress
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded_for = parts
            .headers
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .and_then(first_forwarded);

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Self {
            forwarded_for,
            peer,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use axum::http::Request;

    use super::*;

    fn address(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> ClientAddress {
        ClientAddress {
            forwarded_for: forwarded_for.map(str::to_string),
            peer,
        }
    }

    #[test]
    fn declared_ip_wins() {
        let address = address(Some("198.51.100.2"), Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));

        assert_eq!(
            address.resolve(Some(" 203.0.113.5 ".to_string())),
            Some("203.0.113.5".to_string())
        );
    }

    #[test]
    fn falls_back_to_forwarded_then_peer() {
        let peer = Some(IpAddr::V4(Ipv4Addr::LOCALHOST));

        assert_eq!(
            address(Some("198.51.100.2"), peer).resolve(Some(String::new())),
            Some("198.51.100.2".to_string())
        );
        assert_eq!(address(None, peer).resolve(None), Some("127.0.0.1".to_string()));
        assert_eq!(address(None, None).resolve(None), None);
    }

    #[test]
    fn reports_mapped_ipv6_peer_as_ipv4() {
        let peer: IpAddr = "::ffff:192.0.2.1".parse().unwrap();

        assert_eq!(
            address(None, Some(peer)).resolve(None),
            Some("192.0.2.1".to_string())
        );
    }

    #[test]
    fn takes_first_forwarded_entry() {
        assert_eq!(
            first_forwarded(" 198.51.100.2 , 10.0.0.1"),
            Some("198.51.100.2".to_string())
        );
        assert_eq!(first_forwarded(" , 10.0.0.1"), None);
        assert_eq!(first_forwarded(""), None);
    }

    #[tokio::test]
    async fn extracts_header_and_peer() {
        let peer: SocketAddr = "192.0.2.7:40000".parse().unwrap();
        let request = Request::builder()
            .header("X-Forwarded-For", "198.51.100.2, 10.0.0.1")
            .extension(ConnectInfo(peer))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let address = ClientAddress::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(address.forwarded_for, Some("198.51.100.2".to_string()));
        assert_eq!(address.peer, Some(peer.ip()));
    }

    #[tokio::test]
    async fn tolerates_missing_header_and_connect_info() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();

        let address = ClientAddress::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(address, ClientAddress::default());
    }
}
