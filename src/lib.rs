pub mod cert;
pub mod cli;
pub mod utils;

// Re-export specific items to avoid conflicts
pub use cert::{CertificateDetails, CertificateRecord, PrintOptions};
pub use cli::{args, commands};
pub use utils::errors;
