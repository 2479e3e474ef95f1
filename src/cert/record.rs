use crate::utils::errors::{CertPrintError, Result};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use x509_parser::prelude::*;

const PEM_LINE_WIDTH: usize = 64;

/// One decoded certificate from a bundle. Owns the DER bytes so the record
/// can always be re-serialized to its canonical PEM form.
#[derive(Debug, Clone)]
pub struct CertificateRecord {
    der: Vec<u8>,
    details: CertificateDetails,
}

/// Structured fields extracted from a certificate, used for both the
/// human-readable block and the JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateDetails {
    pub subject: String,
    pub issuer: String,
    pub serial: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub sans: Vec<String>,
    pub key_usage: Vec<String>,
    pub is_ca: bool,
    pub fingerprint_sha256: String,
}

impl CertificateRecord {
    /// Parse a DER-encoded certificate into a record
    pub fn from_der(der: Vec<u8>) -> Result<Self> {
        let (_, cert) = X509Certificate::from_der(&der)
            .map_err(|e| CertPrintError::Decode(format!("DER parsing error: {e}")))?;

        let details = CertificateDetails::extract(&cert, &der);
        Ok(Self { der, details })
    }

    pub fn details(&self) -> &CertificateDetails {
        &self.details
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Canonical PEM re-serialization: standard base64 of the DER wrapped at
    /// 64 columns between certificate markers, trailing newline included.
    pub fn to_pem(&self) -> String {
        let b64 = general_purpose::STANDARD.encode(&self.der);
        let mut pem = String::with_capacity(b64.len() + b64.len() / PEM_LINE_WIDTH + 64);

        pem.push_str("-----BEGIN CERTIFICATE-----\n");
        let mut rest = b64.as_str();
        while !rest.is_empty() {
            let (line, tail) = rest.split_at(rest.len().min(PEM_LINE_WIDTH));
            pem.push_str(line);
            pem.push('\n');
            rest = tail;
        }
        pem.push_str("-----END CERTIFICATE-----\n");
        pem
    }
}

impl fmt::Display for CertificateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.details;
        writeln!(f, "Certificate:")?;
        writeln!(f, "    Subject: {}", d.subject)?;
        writeln!(f, "    Issuer: {}", d.issuer)?;
        writeln!(f, "    Serial: {}", d.serial)?;
        writeln!(
            f,
            "    Not before: {}",
            d.not_before.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            f,
            "    Not after: {}",
            d.not_after.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f, "    CA: {}", d.is_ca)?;
        if !d.sans.is_empty() {
            writeln!(f, "    SANs: {}", d.sans.join(", "))?;
        }
        if !d.key_usage.is_empty() {
            writeln!(f, "    Key usage: {}", d.key_usage.join(", "))?;
        }
        write!(f, "    Fingerprint (SHA-256): {}", d.fingerprint_sha256)
    }
}

impl CertificateDetails {
    fn extract(cert: &X509Certificate, der: &[u8]) -> Self {
        // Serial normalized to continuous lowercase hex
        let serial = hex::encode(cert.serial.to_bytes_be());

        let not_before = DateTime::from_timestamp(cert.validity().not_before.timestamp(), 0)
            .unwrap_or_else(Utc::now);
        let not_after = DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0)
            .unwrap_or_else(Utc::now);

        let mut sans = Vec::new();
        let mut key_usage = Vec::new();
        let mut is_ca = false;

        for ext in cert.extensions() {
            match ext.parsed_extension() {
                ParsedExtension::SubjectAlternativeName(san) => {
                    for name in &san.general_names {
                        match name {
                            GeneralName::DNSName(dns) => sans.push(dns.to_string()),
                            GeneralName::IPAddress(ip) => {
                                if let Ok(v4) = <[u8; 4]>::try_from(*ip) {
                                    sans.push(Ipv4Addr::from(v4).to_string());
                                } else if let Ok(v6) = <[u8; 16]>::try_from(*ip) {
                                    sans.push(Ipv6Addr::from(v6).to_string());
                                }
                            }
                            _ => {} // Skip other name types
                        }
                    }
                }
                ParsedExtension::KeyUsage(ku) => key_usage = key_usage_names(ku),
                ParsedExtension::BasicConstraints(bc) => is_ca = bc.ca,
                _ => {}
            }
        }

        Self {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial,
            not_before,
            not_after,
            sans,
            key_usage,
            is_ca,
            fingerprint_sha256: hex::encode(Sha256::digest(der)),
        }
    }
}

fn key_usage_names(ku: &KeyUsage) -> Vec<String> {
    let flags = [
        ("DigitalSignature", ku.digital_signature()),
        ("NonRepudiation", ku.non_repudiation()),
        ("KeyEncipherment", ku.key_encipherment()),
        ("DataEncipherment", ku.data_encipherment()),
        ("KeyAgreement", ku.key_agreement()),
        ("KeyCertSign", ku.key_cert_sign()),
        ("CRLSign", ku.crl_sign()),
        ("EncipherOnly", ku.encipher_only()),
        ("DecipherOnly", ku.decipher_only()),
    ];

    flags
        .iter()
        .filter(|(_, set)| *set)
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::fixtures::{CA_PEM, LEAF_PEM};
    use crate::cert::parser::decode_next;

    fn leaf() -> CertificateRecord {
        decode_next(LEAF_PEM.as_bytes()).unwrap().0
    }

    fn ca() -> CertificateRecord {
        decode_next(CA_PEM.as_bytes()).unwrap().0
    }

    #[test]
    fn test_extracted_fields_leaf() {
        let record = leaf();
        let d = record.details();

        assert!(d.subject.contains("server.internal.example"));
        assert!(d.subject.contains("Example Labs"));
        // Self-signed, so issuer mirrors the subject
        assert_eq!(d.subject, d.issuer);
        assert_eq!(d.serial, "1e63fbe11256cf7a1b926f228bf78ab7864bb732");
        assert!(!d.is_ca);
        assert!(d.sans.contains(&"server.internal.example".to_string()));
        assert!(d.sans.contains(&"10.0.0.12".to_string()));
        assert!(d.key_usage.contains(&"DigitalSignature".to_string()));
        assert!(d.key_usage.contains(&"KeyEncipherment".to_string()));
        assert_eq!(d.fingerprint_sha256.len(), 64);
        assert!(d.not_before < d.not_after);
    }

    #[test]
    fn test_extracted_fields_ca() {
        let record = ca();
        let d = record.details();

        assert!(d.subject.contains("Example Root CA"));
        assert!(d.is_ca);
        assert!(d.sans.is_empty());
        assert!(d.key_usage.contains(&"KeyCertSign".to_string()));
        assert!(d.key_usage.contains(&"CRLSign".to_string()));
    }

    #[test]
    fn test_to_pem_round_trips() {
        let record = leaf();
        let pem = record.to_pem();

        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert!(pem.ends_with("-----END CERTIFICATE-----\n"));
        assert!(pem.lines().all(|line| line.len() <= 64));

        let (reparsed, rest) = decode_next(pem.as_bytes()).unwrap();
        assert!(crate::cert::parser::is_exhausted(rest));
        assert_eq!(reparsed.der(), record.der());
    }

    #[test]
    fn test_to_pem_matches_original_encoding() {
        // openssl also wraps base64 at 64 columns, so the canonical form is
        // byte-identical to the fixture
        assert_eq!(leaf().to_pem(), LEAF_PEM);
    }

    #[test]
    fn test_display_contains_field_lines() {
        let text = leaf().to_string();
        assert!(text.starts_with("Certificate:\n"));
        assert!(text.contains("    Subject: "));
        assert!(text.contains("    Not before: "));
        assert!(text.contains("    SANs: "));
        assert!(text.contains("    Fingerprint (SHA-256): "));
        // Trailing newline is added by the renderer, not the record itself
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_details_json_round_trip() {
        let record = ca();
        let json = serde_json::to_string(record.details()).unwrap();
        let parsed: CertificateDetails = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, record.details());
    }
}
