use crate::cert::record::CertificateRecord;
use crate::utils::errors::{CertPrintError, Result};
use base64::{engine::general_purpose, Engine as _};

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Decode the next certificate from a PEM bundle.
///
/// Returns the decoded record together with the unconsumed tail of the
/// buffer. Text before the first certificate marker is skipped, matching the
/// usual PEM framing convention. A buffer that holds no certificate block at
/// all is an error; use [`is_exhausted`] to detect normal termination before
/// calling this again.
pub fn decode_next(bundle: &[u8]) -> Result<(CertificateRecord, &[u8])> {
    let text = std::str::from_utf8(bundle)
        .map_err(|e| CertPrintError::Decode(format!("bundle is not valid UTF-8: {e}")))?;

    let begin = text
        .find(PEM_BEGIN)
        .ok_or_else(|| CertPrintError::Decode("no certificate PEM block found".to_string()))?;
    let body_start = begin + PEM_BEGIN.len();

    let body_len = text[body_start..].find(PEM_END).ok_or_else(|| {
        CertPrintError::Decode("unterminated certificate PEM block".to_string())
    })?;
    let body = &text[body_start..body_start + body_len];
    let remainder = &text[body_start + body_len + PEM_END.len()..];

    let b64: String = body.split_whitespace().collect();
    let der = general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| CertPrintError::Decode(format!("base64 decode error: {e}")))?;

    let record = CertificateRecord::from_der(der)?;
    Ok((record, remainder.as_bytes()))
}

/// True when the buffer holds no further data to decode: empty or whitespace
/// only. This is the bundle's normal termination signal, not an error.
pub fn is_exhausted(buf: &[u8]) -> bool {
    buf.iter().all(|b| b.is_ascii_whitespace())
}
