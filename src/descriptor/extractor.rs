//! Endpoint extractor for parsed descriptors
//!
//! Pulls a candidate (host, port) pair out of a classified descriptor.
//! Extraction is a pure function: malformed input yields `None`, never an
//! error, and the caller treats absence as a drop signal.

use crate::descriptor::models::{Descriptor, DescriptorKind, Endpoint};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::Value;
use url::Url;

/// Field-alias lookup rules for kinds whose body is a JSON object.
///
/// Adding a new JSON-bodied kind means adding one table entry here, not
/// branching logic elsewhere.
struct FieldAliases {
    host: &'static [&'static str],
    port: &'static [&'static str],
}

const VMESS_ALIASES: FieldAliases = FieldAliases {
    host: &["add", "address", "host", "server", "hostname", "server_address"],
    port: &["port", "server_port"],
};

impl DescriptorKind {
    fn json_aliases(&self) -> Option<&'static FieldAliases> {
        match self {
            DescriptorKind::Vmess => Some(&VMESS_ALIASES),
            _ => None,
        }
    }
}

/// Extract the endpoint of a descriptor, or `None` when the descriptor
/// carries no usable host.
pub fn extract(descriptor: &Descriptor) -> Option<Endpoint> {
    match descriptor.kind {
        DescriptorKind::Vmess => extract_json_body(descriptor),
        DescriptorKind::Vless
        | DescriptorKind::Trojan
        | DescriptorKind::Tuic
        | DescriptorKind::Hysteria2 => extract_uri(&descriptor.raw),
        DescriptorKind::Shadowsocks => extract_shadowsocks(&descriptor.raw),
        DescriptorKind::Unknown => None,
    }
}

/// Extract from a kind whose body is base64-encoded JSON (vmess)
fn extract_json_body(descriptor: &Descriptor) -> Option<Endpoint> {
    let aliases = descriptor.kind.json_aliases()?;
    let body = descriptor.raw.trim().split_once("://")?.1;
    let decoded = decode_base64_lenient(body)?;
    let json: Value = serde_json::from_slice(&decoded).ok()?;

    let host = aliases
        .host
        .iter()
        .filter_map(|key| json.get(key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|value| !value.is_empty())?
        .to_string();

    // The port field is a number in some emitters and a quoted string in
    // others; accept both, and treat 0/absent as unspecified.
    let port = aliases
        .port
        .iter()
        .filter_map(|key| json.get(key))
        .find_map(port_value)
        .filter(|&port| port > 0);

    Some(Endpoint::new(host, port))
}

fn port_value(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Extract from a URI-authority kind (vless, trojan, tuic, hysteria2)
fn extract_uri(raw: &str) -> Option<Endpoint> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.trim_matches(|c| c == '[' || c == ']');
    if host.is_empty() {
        return None;
    }
    // Port 0 is as good as no port: the fallback list takes over.
    let port = url.port().filter(|&port| port > 0);
    Some(Endpoint::new(host.to_string(), port))
}

/// Extract from a shadowsocks descriptor
///
/// Two formats exist in the wild: the URI form `ss://userinfo@host:port` and
/// the legacy form where everything after the scheme is one base64 blob
/// decoding to `method:password@host:port`.
fn extract_shadowsocks(raw: &str) -> Option<Endpoint> {
    let body = raw.trim().split_once("://")?.1;
    // Strip the fragment (display name) before deciding which form this is.
    let body = body.split('#').next().unwrap_or(body);

    if body.contains('@') {
        return extract_uri(raw);
    }

    let decoded = decode_base64_lenient(body)?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (_, authority) = decoded.rsplit_once('@')?;
    let (host, port) = authority.rsplit_once(':')?;
    let host = host.trim();
    if host.is_empty() {
        return None;
    }
    let port = port.trim().parse().ok().filter(|&port| port > 0);
    Some(Endpoint::new(host.to_string(), port))
}

/// Decode base64 accepting the padding and alphabet variants subscription
/// tooling produces.
fn decode_base64_lenient(input: &str) -> Option<Vec<u8>> {
    let input = input.trim();
    STANDARD
        .decode(input)
        .or_else(|_| STANDARD_NO_PAD.decode(input))
        .or_else(|_| URL_SAFE.decode(input))
        .or_else(|_| URL_SAFE_NO_PAD.decode(input))
        .ok()
}
