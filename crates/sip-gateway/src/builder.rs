//! Response serialization
//!
//! Responses are built directly as text. Dialog identification headers are
//! echoed from the request so the peer can match the response.

use std::fmt::Write;

use chrono::Utc;

use crate::message::{
    HEADER_CALL_ID, HEADER_CONTENT_LENGTH, HEADER_CONTENT_TYPE, HEADER_CSEQ, HEADER_FROM,
    HEADER_TO, HEADER_VIA, Method, SignalingRequest,
};

/// Headers copied from the request into every response, in this order
const ECHOED_HEADERS: [&str; 5] = [HEADER_VIA, HEADER_TO, HEADER_FROM, HEADER_CALL_ID, HEADER_CSEQ];

const SDP_CONTENT_TYPE: &str = "application/sdp";

/// Codes that leave the To header untagged
fn is_untagged_provisional(status: u16) -> bool {
    matches!(status, 100 | 180 | 183)
}

/// Session description advertising one PCMU audio stream at `host`
pub fn pcmu_offer_sdp(host: &str) -> String {
    format!(
        "v=0\r\n\
         o=- 0 0 IN IP4 {host}\r\n\
         s=-\r\n\
         c=IN IP4 {host}\r\n\
         t=0 0\r\n\
         m=audio 9 RTP/AVP 0\r\n\
         a=rtpmap:0 PCMU/8000\r\n"
    )
}

fn clock_tag() -> u32 {
    Utc::now().timestamp_subsec_nanos() % 100_000
}

/// Serialize a response to `request`
///
/// `extra_headers` are written after the echoed ones. A `200` to an INVITE
/// carries an SDP body describing audio at `media_host`; every other
/// response has an empty body.
pub fn generate_response(
    status: u16,
    reason: &str,
    request: &SignalingRequest,
    extra_headers: &[(&str, String)],
    media_host: &str,
) -> String {
    let mut out = String::with_capacity(512);
    let _ = write!(out, "{} {} {}\r\n", request.version, status, reason);

    for name in ECHOED_HEADERS {
        let Some(value) = request.header(name) else {
            continue;
        };
        if name == HEADER_TO && !is_untagged_provisional(status) && !value.contains(";tag=") {
            let _ = write!(out, "{}: {};tag={}\r\n", name, value, clock_tag());
        } else {
            let _ = write!(out, "{}: {}\r\n", name, value);
        }
    }

    for (name, value) in extra_headers {
        let _ = write!(out, "{}: {}\r\n", name, value);
    }

    let body = if status == 200 && request.method == Method::Invite {
        let _ = write!(out, "{}: {}\r\n", HEADER_CONTENT_TYPE, SDP_CONTENT_TYPE);
        pcmu_offer_sdp(media_host)
    } else {
        String::new()
    };

    let _ = write!(out, "{}: {}\r\n\r\n", HEADER_CONTENT_LENGTH, body.len());
    out.push_str(&body);
    out
}
