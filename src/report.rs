//! Aggregation of per-host results and errors.
//!
//! A [`Report`] is filled host by host, in order. Hosts whose certificates
//! were collected end up in the result list; every failure (including ones
//! recorded later, such as rendering or expiration problems) lands in an
//! ordered error list that [`merge_errors`] collapses into a single error.

use chrono::{DateTime, Utc};
use log::warn;
use std::time::Duration;

use crate::collector::fetch_certificates;
use crate::{CertInfoError, CertificateRecord, HostResult, HostTarget};

#[derive(Debug, Default)]
pub struct Report {
    results: Vec<HostResult>,
    errors: Vec<CertInfoError>,
}

impl Report {
    /// Inspects every target over the network, one after another.
    pub fn collect(targets: &[HostTarget], timeout: Duration) -> Report {
        let mut report = Report::default();
        report.collect_with(targets, |target| fetch_certificates(target, timeout));
        report
    }

    /// Runs `fetch` for every target, in order.
    ///
    /// A failed target contributes only its error; the remaining targets are
    /// still processed.
    pub fn collect_with<F>(&mut self, targets: &[HostTarget], mut fetch: F)
    where
        F: FnMut(&HostTarget) -> Result<Vec<CertificateRecord>, CertInfoError>,
    {
        for target in targets {
            match fetch(target) {
                Ok(certs) => self.results.push(HostResult::new(target, certs)),
                Err(err) => {
                    warn!("failed to inspect {}: {}", target, err);
                    self.errors.push(err);
                }
            }
        }
    }

    pub fn record(&mut self, err: CertInfoError) {
        self.errors.push(err);
    }

    /// Adds an error for every certificate that expires before `now + horizon`.
    ///
    /// A zero horizon disables the check.
    pub fn check_expiration(&mut self, horizon: Duration, now: DateTime<Utc>) {
        if horizon.is_zero() {
            return;
        }
        let deadline = chrono::Duration::from_std(horizon)
            .ok()
            .and_then(|h| now.checked_add_signed(h))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let expiring = self
            .results
            .iter()
            .flat_map(|host| host.certs.iter())
            .filter(|cert| deadline > cert.not_after)
            .map(|cert| CertInfoError::Expiration {
                subject: cert.subject.clone(),
                not_after: cert.not_after,
                horizon,
            });
        self.errors.extend(expiring);
    }

    pub fn results(&self) -> &[HostResult] {
        &self.results
    }

    pub fn errors(&self) -> &[CertInfoError] {
        &self.errors
    }

    /// Consumes the report, returning the results and the merged error.
    pub fn finish(self) -> (Vec<HostResult>, Option<CertInfoError>) {
        (self.results, merge_errors(self.errors))
    }
}

/// Collapses a list of errors into one.
///
/// No errors gives `None`, a single error is returned unchanged and several
/// errors become [`CertInfoError::Multiple`], keeping their order.
pub fn merge_errors(mut errors: Vec<CertInfoError>) -> Option<CertInfoError> {
    match errors.len() {
        0 => None,
        1 => errors.pop(),
        _ => Some(CertInfoError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io;

    const WEEK: Duration = Duration::from_secs(7 * 24 * 3600);

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn cert(subject: &str, days_left: i64) -> CertificateRecord {
        CertificateRecord {
            issuer: "Test CA".to_string(),
            subject: subject.to_string(),
            not_before: now() - chrono::Duration::days(60),
            not_after: now() + chrono::Duration::days(days_left),
            dns_names: vec![subject.to_string()],
        }
    }

    fn refused(target: &HostTarget) -> CertInfoError {
        CertInfoError::Dial {
            address: target.address(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
        }
    }

    #[test]
    fn test_failed_hosts_are_dropped_in_order() {
        let targets = vec![
            HostTarget::new("a.test", 443),
            HostTarget::new("down.test", 443),
            HostTarget::new("b.test", 8443),
        ];
        let mut report = Report::default();
        report.collect_with(&targets, |target| {
            if target.host == "down.test" {
                Err(refused(target))
            } else {
                Ok(vec![cert(&target.host, 30)])
            }
        });

        let hosts: Vec<_> = report
            .results()
            .iter()
            .map(|r| (r.host.as_str(), r.port))
            .collect();
        assert_eq!(hosts, vec![("a.test", 443), ("b.test", 8443)]);
        assert_eq!(report.errors().len(), 1);
        assert_eq!(
            report.errors()[0].to_string(),
            "dial tcp down.test:443: connection refused"
        );
    }

    #[test]
    fn test_every_host_is_attempted_after_failures() {
        let targets = vec![
            HostTarget::new("x.test", 443),
            HostTarget::new("y.test", 443),
            HostTarget::new("z.test", 443),
        ];
        let mut attempted = Vec::new();
        let mut report = Report::default();
        report.collect_with(&targets, |target| {
            attempted.push(target.host.clone());
            Err(refused(target))
        });

        assert_eq!(attempted, vec!["x.test", "y.test", "z.test"]);
        assert!(report.results().is_empty());
        assert_eq!(report.errors().len(), 3);
    }

    #[test]
    fn test_expiration_one_error_per_certificate() {
        let targets = vec![HostTarget::new("a.test", 443)];
        let mut report = Report::default();
        report.collect_with(&targets, |_| {
            Ok(vec![cert("soon.test", 2), cert("fine.test", 30), cert("gone.test", -1)])
        });
        report.check_expiration(WEEK, now());

        let subjects: Vec<_> = report
            .errors()
            .iter()
            .map(|e| match e {
                CertInfoError::Expiration { subject, .. } => subject.as_str(),
                other => panic!("Expected Expiration, got {:?}", other),
            })
            .collect();
        assert_eq!(subjects, vec!["soon.test", "gone.test"]);
        assert_eq!(report.results()[0].certs.len(), 3);
    }

    #[test]
    fn test_zero_horizon_disables_expiration() {
        let targets = vec![HostTarget::new("a.test", 443)];
        let mut report = Report::default();
        report.collect_with(&targets, |_| Ok(vec![cert("gone.test", -100)]));
        report.check_expiration(Duration::ZERO, now());

        let (results, error) = report.finish();
        assert_eq!(results.len(), 1);
        assert!(error.is_none());
    }

    #[test]
    fn test_huge_horizon_flags_everything() {
        let targets = vec![HostTarget::new("a.test", 443)];
        let mut report = Report::default();
        report.collect_with(&targets, |_| Ok(vec![cert("far.test", 3650)]));
        report.check_expiration(Duration::from_secs(u64::MAX), now());
        assert_eq!(report.errors().len(), 1);
    }

    #[test]
    fn test_merge_none() {
        assert!(merge_errors(Vec::new()).is_none());
    }

    #[test]
    fn test_merge_single_is_unwrapped() {
        let target = HostTarget::new("down.test", 443);
        let merged = merge_errors(vec![refused(&target)]).unwrap();
        assert!(matches!(merged, CertInfoError::Dial { .. }));
        assert_eq!(merged.to_string(), "dial tcp down.test:443: connection refused");
    }

    #[test]
    fn test_merge_many_counts_and_joins() {
        let merged = merge_errors(vec![
            refused(&HostTarget::new("one.test", 443)),
            refused(&HostTarget::new("two.test", 443)),
            CertInfoError::Encoding {
                details: "broken pipe".to_string(),
            },
        ])
        .unwrap();
        assert_eq!(
            merged.to_string(),
            "3 errors: dial tcp one.test:443: connection refused; \
             dial tcp two.test:443: connection refused; \
             failed to render output: broken pipe"
        );
    }

    #[test]
    fn test_recorded_errors_keep_order() {
        let mut report = Report::default();
        report.record(CertInfoError::InvalidInput {
            input: "".to_string(),
            reason: "host cannot be empty".to_string(),
        });
        report.collect_with(&[HostTarget::new("down.test", 443)], |t| Err(refused(t)));

        let (_, error) = report.finish();
        let message = error.unwrap().to_string();
        assert!(message.starts_with("2 errors: invalid host"));
        assert!(message.ends_with("dial tcp down.test:443: connection refused"));
    }
}
