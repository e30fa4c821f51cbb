//! TLS peer certificate inspection
//!
//! The certificate comes from a dedicated handshake with the page's host,
//! verified against the webpki root set, independent of the HTTP client.

use crate::store::CertificateInfo;
use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore, ServerName};
use tokio_rustls::TlsConnector;
use url::{Host, Url};
use x509_parser::parse_x509_certificate;
use x509_parser::time::ASN1Time;

const DEFAULT_TLS_PORT: u16 = 443;

static TLS_CONFIG: Lazy<Arc<ClientConfig>> = Lazy::new(|| {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            ta.subject,
            ta.spki,
            ta.name_constraints,
        )
    }));

    Arc::new(
        ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
});

/// Connects to the host of `url` and summarizes the certificate it presents
///
/// The port comes from the URL, defaulting to 443. Connect and handshake
/// together are bounded by `timeout`.
pub async fn fetch_certificate(url: &Url, timeout: Duration) -> Result<CertificateInfo, String> {
    handshake_certificate(Arc::clone(&TLS_CONFIG), url, timeout).await
}

pub(crate) async fn handshake_certificate(
    config: Arc<ClientConfig>,
    url: &Url,
    timeout: Duration,
) -> Result<CertificateInfo, String> {
    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => ip.to_string(),
        None => return Err(format!("no host in {}", url)),
    };
    let port = url.port_or_known_default().unwrap_or(DEFAULT_TLS_PORT);
    let server_name = ServerName::try_from(host.as_str())
        .map_err(|e| format!("invalid server name '{}': {}", host, e))?;

    let handshake = async {
        let tcp = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|e| format!("connect to {}:{} failed: {}", host, port, e))?;
        TlsConnector::from(config)
            .connect(server_name, tcp)
            .await
            .map_err(|e| format!("TLS handshake with {}:{} failed: {}", host, port, e))
    };

    let stream = tokio::time::timeout(timeout, handshake)
        .await
        .map_err(|_| format!("TLS handshake with {}:{} timed out", host, port))??;

    let (_, session) = stream.get_ref();
    let der = session
        .peer_certificates()
        .and_then(|chain| chain.first())
        .ok_or_else(|| format!("{}:{} presented no certificate", host, port))?;

    inspect_certificate(&der.0)
}

/// Parses a DER-encoded X.509 certificate into a summary
///
/// Returns a human-readable error for the record's warnings when the
/// certificate cannot be parsed.
pub fn inspect_certificate(der: &[u8]) -> Result<CertificateInfo, String> {
    let (_, cert) =
        parse_x509_certificate(der).map_err(|e| format!("invalid certificate: {}", e))?;

    Ok(CertificateInfo {
        issuer: cert.issuer().to_string(),
        subject: cert.subject().to_string(),
        version: cert.version().0 + 1,
        serial_number: cert.raw_serial_as_string(),
        not_before: format_time(&cert.validity().not_before),
        not_after: format_time(&cert.validity().not_after),
    })
}

fn format_time(time: &ASN1Time) -> String {
    Utc.timestamp_opt(time.timestamp(), 0)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| time.to_string())
}
