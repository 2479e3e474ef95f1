use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertPrintError {
    #[error("unable to read certificate bundle: {0}")]
    BundleRead(String),

    #[error("certificate decoding error: {0}")]
    Decode(String),

    #[error("QR encoding error: {0}")]
    QrEncode(String),

    #[error("QR write error: {0}")]
    QrWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CertPrintError>;
