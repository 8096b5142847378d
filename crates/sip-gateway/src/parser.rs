//! Datagram to [`SignalingRequest`] parsing
//!
//! Each datagram must hold exactly one complete request: a request line
//! `METHOD SP URI SP VERSION CRLF`, `Name: Value CRLF` header lines, a blank
//! line and an optional body. Nothing is buffered across datagrams.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use bytes::Bytes;
use tracing::warn;

use crate::error::ParseError;
use crate::message::{Method, SignalingRequest, canonical_header_name};

/// Port assumed when the request target has none
pub const DEFAULT_SIP_PORT: u16 = 5060;

const CRLF: &[u8] = b"\r\n";

fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|window| window == CRLF)
}

/// Parse one datagram and resolve its request target
pub async fn parse_signaling_request(datagram: &[u8]) -> Result<SignalingRequest, ParseError> {
    let line_end = find_crlf(datagram).ok_or(ParseError::MissingRequestLineTerminator)?;
    let request_line =
        std::str::from_utf8(&datagram[..line_end]).map_err(|_| ParseError::InvalidEncoding)?;

    let tokens: Vec<&str> = request_line.split(' ').collect();
    let [method, target_uri, version] = tokens.as_slice() else {
        return Err(ParseError::MalformedRequestLine(request_line.to_string()));
    };
    if method.is_empty() || target_uri.is_empty() || version.is_empty() {
        return Err(ParseError::MalformedRequestLine(request_line.to_string()));
    }

    let (host, port) = split_target(target_uri)?;
    let (headers, body) = parse_headers(&datagram[line_end + CRLF.len()..])?;
    let target = resolve_target(target_uri, &host, port).await?;

    Ok(SignalingRequest {
        method: Method::from_token(method),
        target_uri: target_uri.to_string(),
        target,
        version: version.to_string(),
        headers,
        body,
    })
}

/// Header block and body following the request line
fn parse_headers(
    mut rest: &[u8],
) -> Result<(HashMap<String, String>, Option<Bytes>), ParseError> {
    let mut headers = HashMap::new();
    let mut body = None;

    while !rest.is_empty() {
        let Some(end) = find_crlf(rest) else {
            if rest.iter().all(u8::is_ascii_whitespace) {
                break;
            }
            return Err(ParseError::UnterminatedHeader);
        };

        if end == 0 {
            let remaining = &rest[CRLF.len()..];
            if !remaining.is_empty() {
                body = Some(Bytes::copy_from_slice(remaining));
            }
            break;
        }

        let line = String::from_utf8_lossy(&rest[..end]);
        match line.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                headers.insert(canonical_header_name(name.trim()), value.trim().to_string());
            }
            _ => warn!(line = %line, "Ignoring malformed header line"),
        }
        rest = &rest[end + CRLF.len()..];
    }

    Ok((headers, body))
}

/// Host and port named by a request target such as `sip:bob@192.0.2.4:5070`
pub fn split_target(uri: &str) -> Result<(String, u16), ParseError> {
    let invalid = |reason: &str| ParseError::InvalidTarget {
        target: uri.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = uri.strip_prefix('<').unwrap_or(uri);
    let trimmed = trimmed.strip_suffix('>').unwrap_or(trimmed);
    let without_scheme = strip_scheme(trimmed);

    let host_port = without_scheme.rsplit('@').next().unwrap_or(without_scheme);
    let host_port = host_port.split([';', '?']).next().unwrap_or(host_port);
    if host_port.is_empty() {
        return Err(invalid("empty host"));
    }

    let parse_port = |port: &str| port.parse::<u16>().map_err(|_| invalid("invalid port"));

    if let Some(bracketed) = host_port.strip_prefix('[') {
        let (host, after) = bracketed
            .split_once(']')
            .ok_or_else(|| invalid("unterminated IPv6 literal"))?;
        let port = match after {
            "" => DEFAULT_SIP_PORT,
            _ => parse_port(after.strip_prefix(':').ok_or_else(|| invalid("junk after IPv6 literal"))?)?,
        };
        return Ok((host.to_string(), port));
    }

    match host_port.rsplit_once(':') {
        // More than one colon: a bare IPv6 address
        Some((host, _)) if host.contains(':') => Ok((host_port.to_string(), DEFAULT_SIP_PORT)),
        Some((host, port)) if !host.is_empty() => Ok((host.to_string(), parse_port(port)?)),
        Some(_) => Err(invalid("empty host")),
        None => Ok((host_port.to_string(), DEFAULT_SIP_PORT)),
    }
}

fn strip_scheme(uri: &str) -> &str {
    for scheme in ["sip:", "sips:"] {
        if uri
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        {
            return &uri[scheme.len()..];
        }
    }
    uri
}

async fn resolve_target(uri: &str, host: &str, port: u16) -> Result<SocketAddr, ParseError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| ParseError::UnresolvableTarget(uri.to_string()))?;
    addrs
        .next()
        .ok_or_else(|| ParseError::UnresolvableTarget(uri.to_string()))
}
