use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::{CertInfoError, CertificateRecord, HostResult};

#[derive(Serialize)]
struct HostView<'a> {
    #[serde(rename = "Host")]
    host: &'a str,
    #[serde(rename = "Port")]
    port: u16,
    #[serde(rename = "Certs")]
    certs: Vec<CertView<'a>>,
}

#[derive(Serialize)]
struct CertView<'a> {
    #[serde(rename = "Issuer")]
    issuer: &'a str,
    #[serde(rename = "Subject")]
    subject: &'a str,
    #[serde(rename = "NotBefore")]
    not_before: DateTime<Utc>,
    #[serde(rename = "NotAfter")]
    not_after: DateTime<Utc>,
    #[serde(rename = "DNSNames")]
    dns_names: &'a [String],
}

impl<'a> From<&'a HostResult> for HostView<'a> {
    fn from(result: &'a HostResult) -> Self {
        HostView {
            host: &result.host,
            port: result.port,
            certs: result.certs.iter().map(CertView::from).collect(),
        }
    }
}

impl<'a> From<&'a CertificateRecord> for CertView<'a> {
    fn from(cert: &'a CertificateRecord) -> Self {
        CertView {
            issuer: &cert.issuer,
            subject: &cert.subject,
            not_before: cert.not_before,
            not_after: cert.not_after,
            dns_names: &cert.dns_names,
        }
    }
}

/// Writes `results` as a pretty-printed JSON array followed by a newline.
pub fn render<W: Write>(results: &[HostResult], out: &mut W) -> Result<(), CertInfoError> {
    let views: Vec<HostView> = results.iter().map(HostView::from).collect();
    serde_json::to_writer_pretty(&mut *out, &views)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
