//! Error types for certificate inspection.
//!
//! Every failure the tool can run into is a [`CertInfoError`]. Per-host
//! failures carry the `host:port` they belong to so that, once merged into a
//! single report error, each message still says which host it came from.

use chrono::{DateTime, SecondsFormat, Utc};
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::duration::format_duration;

/// Error type for certificate inspection failures.
#[derive(Debug, Error)]
pub enum CertInfoError {
    /// A host argument could not be turned into a target
    #[error("invalid host {input:?}: {reason}")]
    InvalidInput {
        /// The raw host argument
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// The TCP connection could not be established (resolution, refusal or timeout)
    #[error("dial tcp {address}: {source}")]
    Dial {
        /// The address (host:port) that could not be reached
        address: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The TLS handshake failed after the connection was made
    #[error("tls handshake with {address} failed: {details}")]
    Handshake {
        /// The address (host:port) of the peer
        address: String,
        /// Details reported by the TLS layer
        details: String,
    },

    /// A peer certificate could not be read
    #[error("certificate error: {reason}")]
    Certificate {
        /// Description of what went wrong
        reason: String,
    },

    /// A collected certificate expires before the configured deadline
    #[error(
        "cert for {subject} expires too soon: {} less than {} away",
        rfc3339(.not_after),
        horizon_text(.horizon)
    )]
    Expiration {
        /// Subject common name of the certificate
        subject: String,
        /// The certificate's not-after time
        not_after: DateTime<Utc>,
        /// The configured expiration horizon
        horizon: Duration,
    },

    /// Rendering the results failed
    #[error("failed to render output: {details}")]
    Encoding {
        /// The underlying encoder or writer error
        details: String,
    },

    /// Several errors merged into one
    #[error("{} errors: {}", .0.len(), join_messages(.0))]
    Multiple(Vec<CertInfoError>),
}

fn rfc3339(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn horizon_text(horizon: &Duration) -> String {
    format_duration(*horizon)
}

fn join_messages(errors: &[CertInfoError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<openssl::error::ErrorStack> for CertInfoError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::Certificate {
            reason: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for CertInfoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encoding {
            details: e.to_string(),
        }
    }
}

impl From<io::Error> for CertInfoError {
    fn from(e: io::Error) -> Self {
        Self::Encoding {
            details: e.to_string(),
        }
    }
}
