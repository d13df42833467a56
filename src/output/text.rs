use chrono::{DateTime, Utc};
use std::io::Write;

use crate::{CertInfoError, HostResult};

const TIME_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

fn format_time(time: &DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Writes a human readable listing of every host and its certificates.
pub fn render<W: Write>(results: &[HostResult], out: &mut W) -> Result<(), CertInfoError> {
    for host in results {
        writeln!(out, "Host: {}:{}", host.host, host.port)?;
        writeln!(out, "Certs:")?;
        for cert in &host.certs {
            writeln!(out, "    Issuer: {}", cert.issuer)?;
            writeln!(out, "    Subject: {}", cert.subject)?;
            writeln!(out, "    Not Before: {}", format_time(&cert.not_before))?;
            writeln!(out, "    Not After: {}", format_time(&cert.not_after))?;
            writeln!(out, "    DNS names: {}", cert.dns_names.join(" "))?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CertificateRecord;
    use chrono::TimeZone;

    #[test]
    fn test_text_layout() {
        let results = vec![HostResult {
            host: "example.com".to_string(),
            port: 443,
            certs: vec![CertificateRecord {
                issuer: "Example CA".to_string(),
                subject: "example.com".to_string(),
                not_before: Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap(),
                not_after: Utc.with_ymd_and_hms(2006, 11, 12, 0, 30, 0).unwrap(),
                dns_names: vec!["example.com".to_string(), "www.example.com".to_string()],
            }],
        }];

        let mut out = Vec::new();
        render(&results, &mut out).unwrap();
        let expected = "Host: example.com:443\n\
                        Certs:\n    \
                        Issuer: Example CA\n    \
                        Subject: example.com\n    \
                        Not Before: Jan 2, 2006 3:04 PM\n    \
                        Not After: Nov 12, 2006 12:30 AM\n    \
                        DNS names: example.com www.example.com\n\n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_host_without_certs() {
        let results = vec![HostResult {
            host: "ca-only.test".to_string(),
            port: 8443,
            certs: Vec::new(),
        }];
        let mut out = Vec::new();
        render(&results, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Host: ca-only.test:8443\nCerts:\n");
    }
}
