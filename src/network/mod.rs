//! Network info resolution.
//!
//! Resolves a hostname to its IPv4/IPv6 addresses over DNS-over-HTTPS and
//! labels the IPv4 address with its ISP/organization. Every lookup here is
//! best-effort: failures are logged at debug level and degrade the field to
//! `None`, nothing is ever returned as an error.

mod dns;
mod ip_intel;

use async_trait::async_trait;

pub use dns::DohResolver;
pub use ip_intel::{IpApiLookup, IpDetails, IpKind};

/// DNS record types the resolver is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    Aaaa,
}

impl RecordType {
    /// Mnemonic used in queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }

    /// Numeric RR type (RFC 1035 / RFC 3596).
    pub fn code(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Aaaa => 28,
        }
    }
}

/// Resolves one record of a host. Returns `None` on any failure.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn lookup(&self, hostname: &str, record: RecordType) -> Option<String>;
}

/// Looks up ISP/organization data for an IP. Returns `None` on any failure.
#[async_trait]
pub trait IpIntelligence: Send + Sync {
    async fn lookup(&self, ip: &str) -> Option<IpDetails>;
}

/// Addresses and hosting provider of a host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkInfo {
    pub ip: Option<String>,
    pub ipv6: Option<String>,
    pub provider: Option<String>,
    pub details: Option<IpDetails>,
}

/// Resolves A and AAAA records for `hostname` and, if an IPv4 address was
/// found, the hosting provider for it. Never fails.
pub async fn resolve_network_info(
    hostname: &str,
    dns: &dyn DnsResolver,
    intel: &dyn IpIntelligence,
) -> NetworkInfo {
    let ip = dns.lookup(hostname, RecordType::A).await;
    let ipv6 = dns.lookup(hostname, RecordType::Aaaa).await;

    let details = match &ip {
        Some(address) => intel.lookup(address).await,
        None => None,
    };
    let provider = details.as_ref().and_then(IpDetails::provider);

    log::debug!(
        "Network info for {}: ip={:?} ipv6={:?} provider={:?}",
        hostname,
        ip,
        ipv6,
        provider
    );
    NetworkInfo {
        ip,
        ipv6,
        provider,
        details,
    }
}
