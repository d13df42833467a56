//! Inspect the leaf certificates presented by TLS hosts.
//!
//! `certinfo` connects to each requested host, performs a TLS handshake with
//! peer verification disabled and records the non-CA certificates the peer
//! sent. Results for all hosts are gathered in a [`Report`], which also checks
//! every collected certificate against an expiration horizon and merges all
//! failures into a single error.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use certinfo::{HostTarget, Report};
//!
//! let targets = vec![HostTarget::parse("example.com", 443)?];
//! let mut report = Report::collect(&targets, Duration::from_secs(5));
//! report.check_expiration(Duration::from_secs(7 * 24 * 3600), chrono::Utc::now());
//! let (results, error) = report.finish();
//! for host in &results {
//!     for cert in &host.certs {
//!         println!("{} expires {}", cert.subject, cert.not_after);
//!     }
//! }
//! if let Some(err) = error {
//!     eprintln!("Error: {}", err);
//! }
//! # Ok::<(), certinfo::CertInfoError>(())
//! ```

use chrono::{DateTime, Utc};
use std::fmt;
use url::{Host, Url};

pub mod collector;
pub mod config;
pub mod duration;
pub mod error;
pub mod output;
pub mod report;

pub use collector::fetch_certificates;
pub use error::CertInfoError;
pub use report::{merge_errors, Report};

/// Port used when neither the host argument nor the configuration names one.
pub const DEFAULT_PORT: u16 = 443;

/// A host to inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    pub host: String,
    pub port: u16,
}

impl HostTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        HostTarget {
            host: host.into(),
            port,
        }
    }

    /// Builds a target from a host argument.
    ///
    /// Accepts a bare hostname or IP address, `host:port`, `[v6addr]:port`,
    /// or a URL such as `https://example.com:8443/path`. When the argument
    /// carries no port, `default_port` is used.
    pub fn parse(input: &str, default_port: u16) -> Result<HostTarget, CertInfoError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid_input(input, "host cannot be empty"));
        }

        // bare hosts go through a special scheme so names are lowercased and punycoded
        let parsed = if trimmed.contains("://") {
            Url::parse(trimmed)
        } else {
            Url::parse(&format!("https://{}", trimmed))
        };
        let url = parsed.map_err(|e| invalid_input(input, &e.to_string()))?;

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => return Err(invalid_input(input, "no hostname found")),
        };

        // Url hides a port equal to the scheme default, so look at what was written
        let port = if has_literal_port(trimmed) {
            url.port_or_known_default().unwrap_or(default_port)
        } else {
            default_port
        };

        Ok(HostTarget { host, port })
    }

    /// The `host:port` form used in messages.
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for HostTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

/// Whether the authority part of a host argument spells out a port.
fn has_literal_port(input: &str) -> bool {
    let rest = input.split_once("://").map_or(input, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let port = match host_port.rsplit_once(']') {
        Some((_, after)) => after.strip_prefix(':'),
        None => host_port.rsplit_once(':').map(|(_, port)| port),
    };
    port.is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

fn invalid_input(input: &str, reason: &str) -> CertInfoError {
    CertInfoError::InvalidInput {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// The fields of a peer certificate this tool reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    /// Issuer common name, empty when the issuer has none
    pub issuer: String,
    /// Subject common name, empty when the subject has none
    pub subject: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// DNS subject alternative names, in certificate order
    pub dns_names: Vec<String>,
}

/// The leaf certificates collected from one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostResult {
    pub host: String,
    pub port: u16,
    pub certs: Vec<CertificateRecord>,
}

impl HostResult {
    pub fn new(target: &HostTarget, certs: Vec<CertificateRecord>) -> Self {
        HostResult {
            host: target.host.clone(),
            port: target.port,
            certs,
        }
    }
}
