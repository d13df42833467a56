//! Certificate collection from a single host.
//!
//! Opens a TCP connection, performs a TLS handshake with peer verification
//! turned off and keeps the peer certificates that are not certificate
//! authorities, in the order the peer sent them.

use chrono::{DateTime, Utc};
use log::{debug, info};
use openssl::asn1::{Asn1Time, Asn1TimeRef};
use openssl::nid::Nid;
use openssl::ssl::{HandshakeError, SslConnector, SslMethod, SslVerifyMode};
use openssl::x509::{X509NameRef, X509Ref};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use x509_parser::parse_x509_certificate;

use crate::{CertInfoError, CertificateRecord, HostTarget};

/// Default TCP dial timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects to `target` and returns its leaf certificates.
///
/// The timeout bounds the TCP dial and every read and write of the
/// handshake. The connection is shut down before returning, whatever the
/// outcome of the handshake.
///
/// # Errors
///
/// * [`CertInfoError::Dial`] - the address did not resolve or no connection could be made
/// * [`CertInfoError::Handshake`] - the TLS handshake failed
/// * [`CertInfoError::Certificate`] - a peer certificate could not be decoded
pub fn fetch_certificates(
    target: &HostTarget,
    timeout: Duration,
) -> Result<Vec<CertificateRecord>, CertInfoError> {
    let address = target.address();
    info!("connecting to {}", address);

    let tcp_stream = dial(target, timeout)?;

    let mut builder = SslConnector::builder(SslMethod::tls())?;
    builder.set_verify(SslVerifyMode::NONE);
    let connector = builder.build();
    let ssl = connector
        .configure()?
        .verify_hostname(false)
        .into_ssl(&target.host)?;

    let mut stream = ssl
        .connect(tcp_stream)
        .map_err(|e| CertInfoError::Handshake {
            address: address.clone(),
            details: match e {
                // a blocking socket only yields WouldBlock once its read/write timeout fires
                HandshakeError::WouldBlock(_) => format!("timed out after {:?}", timeout),
                other => other.to_string(),
            },
        })?;

    let certs = leaf_certificates(stream.ssl().peer_cert_chain().into_iter().flatten());

    if let Err(e) = stream.shutdown() {
        debug!("tls shutdown with {} failed: {}", address, e);
    }

    let certs = certs?;
    debug!("kept {} certificates from {}", certs.len(), address);
    Ok(certs)
}

fn dial(target: &HostTarget, timeout: Duration) -> Result<TcpStream, CertInfoError> {
    let dial_error = |source: io::Error| CertInfoError::Dial {
        address: target.address(),
        source,
    };

    let addresses: Vec<SocketAddr> = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .map_err(dial_error)?
        .collect();

    let mut last_error =
        io::Error::new(io::ErrorKind::NotFound, "no addresses found for host");
    for socket_addr in addresses {
        debug!("dialing {}", socket_addr);
        match TcpStream::connect_timeout(&socket_addr, timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(timeout)).map_err(dial_error)?;
                stream.set_write_timeout(Some(timeout)).map_err(dial_error)?;
                return Ok(stream);
            }
            Err(e) => last_error = e,
        }
    }
    Err(dial_error(last_error))
}

/// Converts the peer chain into records, dropping CA certificates.
fn leaf_certificates<'a, I>(chain: I) -> Result<Vec<CertificateRecord>, CertInfoError>
where
    I: IntoIterator<Item = &'a X509Ref>,
{
    let mut certs = Vec::new();
    for cert in chain {
        if is_ca(cert)? {
            debug!("skipping CA certificate {}", common_name(cert.subject_name()));
            continue;
        }
        certs.push(certificate_record(cert)?);
    }
    Ok(certs)
}

/// Whether the certificate's basicConstraints mark it as a CA.
///
/// Certificates without the extension are treated as leaves.
pub fn is_ca(cert: &X509Ref) -> Result<bool, CertInfoError> {
    let der = cert.to_der()?;
    let (_, parsed) = parse_x509_certificate(&der).map_err(|e| CertInfoError::Certificate {
        reason: e.to_string(),
    })?;
    let constraints = parsed
        .basic_constraints()
        .map_err(|e| CertInfoError::Certificate {
            reason: e.to_string(),
        })?;
    Ok(constraints.map(|bc| bc.value.ca).unwrap_or(false))
}

/// Reads the reported fields from a certificate.
pub fn certificate_record(cert: &X509Ref) -> Result<CertificateRecord, CertInfoError> {
    let dns_names = cert
        .subject_alt_names()
        .map(|names| {
            names
                .iter()
                .filter_map(|name| name.dnsname())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(CertificateRecord {
        issuer: common_name(cert.issuer_name()),
        subject: common_name(cert.subject_name()),
        not_before: to_utc(cert.not_before())?,
        not_after: to_utc(cert.not_after())?,
        dns_names,
    })
}

fn common_name(name: &X509NameRef) -> String {
    name.entries_by_nid(Nid::COMMONNAME)
        .next()
        .map(|entry| String::from_utf8_lossy(entry.data().as_slice()).into_owned())
        .unwrap_or_default()
}

fn to_utc(time: &Asn1TimeRef) -> Result<DateTime<Utc>, CertInfoError> {
    let epoch = Asn1Time::from_unix(0)?;
    let diff = epoch.diff(time)?;
    let secs = i64::from(diff.days) * 86_400 + i64::from(diff.secs);
    DateTime::from_timestamp(secs, 0).ok_or_else(|| CertInfoError::Certificate {
        reason: format!("certificate time out of range: {}", time),
    })
}
