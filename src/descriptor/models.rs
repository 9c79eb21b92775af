//! Descriptor data models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Descriptor kind enumeration
///
/// Closed set of recognized descriptor schemes. Anything else is `Unknown`
/// and never reaches the prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DescriptorKind {
    Vmess,
    Vless,
    Trojan,
    Tuic,
    Hysteria2,
    Shadowsocks,
    #[default]
    Unknown,
}

impl DescriptorKind {
    /// Classify a raw descriptor line by its URI scheme prefix.
    ///
    /// Matching is case-insensitive; `hy2://` is accepted as an alias for
    /// `hysteria2://`.
    pub fn classify(raw: &str) -> Self {
        let lower = raw.trim_start().to_ascii_lowercase();

        if lower.starts_with("vmess://") {
            DescriptorKind::Vmess
        } else if lower.starts_with("vless://") {
            DescriptorKind::Vless
        } else if lower.starts_with("trojan://") {
            DescriptorKind::Trojan
        } else if lower.starts_with("tuic://") {
            DescriptorKind::Tuic
        } else if lower.starts_with("hysteria2://") || lower.starts_with("hy2://") {
            DescriptorKind::Hysteria2
        } else if lower.starts_with("ss://") {
            DescriptorKind::Shadowsocks
        } else {
            DescriptorKind::Unknown
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorKind::Vmess => write!(f, "vmess"),
            DescriptorKind::Vless => write!(f, "vless"),
            DescriptorKind::Trojan => write!(f, "trojan"),
            DescriptorKind::Tuic => write!(f, "tuic"),
            DescriptorKind::Hysteria2 => write!(f, "hysteria2"),
            DescriptorKind::Shadowsocks => write!(f, "shadowsocks"),
            DescriptorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single proxy descriptor: opaque raw text plus its classified kind
///
/// Immutable once parsed. The raw text is what survives validation; it is
/// never rewritten, only kept or dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub raw: String,
    pub kind: DescriptorKind,
}

impl Descriptor {
    /// Classify a trimmed descriptor line
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: DescriptorKind::classify(raw),
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Endpoint resolved out of a descriptor
///
/// `port: None` means the descriptor did not carry a usable port; the
/// prober then relies entirely on the fallback-port list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: Option<u16>,
}

impl Endpoint {
    pub fn new(host: String, port: Option<u16>) -> Self {
        Self { host, port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}
