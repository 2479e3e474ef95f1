pub mod parser;
pub mod print;
pub mod qr;
pub mod record;

pub use parser::{decode_next, is_exhausted};
pub use print::{print_bundle, PrintOptions};
pub use qr::{export_qr, indexed_file_name};
pub use record::{CertificateDetails, CertificateRecord};
