use crate::cert::parser::{decode_next, is_exhausted};
use crate::cert::qr::export_qr;
use crate::utils::errors::Result;
use crate::utils::output::RenderFormat;
use std::io::Write;

/// Configuration for one bundle traversal.
#[derive(Debug, Clone)]
pub struct PrintOptions {
    pub format: RenderFormat,
    /// PNG path template; QR export is skipped when unset.
    pub qr_output: Option<String>,
}

/// Decode every certificate in the bundle, render each one to `out`, and
/// optionally export each as a QR code image.
///
/// Certificates are processed strictly in order. The first failure at any
/// stage aborts the traversal; output already written stays written.
pub fn print_bundle(bundle: &[u8], options: &PrintOptions, out: &mut dyn Write) -> Result<()> {
    let mut remaining = bundle;
    let mut index = 0usize;

    loop {
        let (record, rest) = decode_next(remaining)?;
        remaining = rest;

        match options.format {
            RenderFormat::Human => writeln!(out, "{record}")?,
            RenderFormat::Json => {
                let line = serde_json::to_string(record.details())?;
                writeln!(out, "{line}")?;
            }
        }

        if let Some(template) = &options.qr_output {
            export_qr(&record, template, index)?;
        }

        if is_exhausted(remaining) {
            break;
        }
        index += 1;
        tracing::debug!(index, "decoding next certificate in bundle");
    }

    Ok(())
}
