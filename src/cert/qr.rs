use crate::cert::record::CertificateRecord;
use crate::utils::errors::{CertPrintError, Result};
use qrcode::{EcLevel, QrCode};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Pixels rendered per QR module.
const MODULE_PIXELS: u32 = 5;

/// Encode a certificate's canonical PEM form as a QR code PNG and write it to
/// the destination derived from `template` and `index`.
///
/// The symbol is auto-sized at medium error correction; a certificate too
/// large for any valid symbol fails with a `QrEncode` error. The file is
/// written with owner-only permissions.
pub fn export_qr(record: &CertificateRecord, template: &str, index: usize) -> Result<()> {
    let pem = record.to_pem();

    let code = QrCode::with_error_correction_level(pem.as_bytes(), EcLevel::M)
        .map_err(|e| CertPrintError::QrEncode(e.to_string()))?;
    let bitmap = code
        .render::<image::Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .build();

    let mut png = Vec::new();
    bitmap
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| CertPrintError::QrEncode(format!("PNG encoding failed: {e}")))?;

    let dest = indexed_file_name(template, index);
    tracing::debug!(dest = %dest, bytes = png.len(), "writing QR code image");
    write_private(Path::new(&dest), &png)
        .map_err(|e| CertPrintError::QrWrite(format!("{dest}: {e}")))?;

    Ok(())
}

/// Derive the destination file name for the certificate at `index`.
///
/// The first certificate keeps the template unchanged; later ones get the
/// index inserted before the extension: `out.png` + 2 -> `out.2.png`. The
/// extension is the suffix from the last dot of the final path component,
/// empty when that component has no dot.
pub fn indexed_file_name(template: &str, index: usize) -> String {
    if index == 0 {
        return template.to_string();
    }

    let split = template
        .rfind('.')
        .filter(|&dot| !template[dot..].contains('/'))
        .unwrap_or(template.len());
    let (stem, ext) = template.split_at(split);
    format!("{stem}.{index}{ext}")
}

fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    fs::write(path, data)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::fixtures::LEAF_PEM;
    use crate::cert::parser::decode_next;

    const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];

    #[test]
    fn test_indexed_file_name_with_extension() {
        assert_eq!(indexed_file_name("cert.png", 0), "cert.png");
        assert_eq!(indexed_file_name("cert.png", 1), "cert.1.png");
        assert_eq!(indexed_file_name("cert.png", 2), "cert.2.png");
        assert_eq!(indexed_file_name("out/bundle.qr.png", 3), "out/bundle.qr.3.png");
    }

    #[test]
    fn test_indexed_file_name_without_extension() {
        assert_eq!(indexed_file_name("cert", 0), "cert");
        assert_eq!(indexed_file_name("cert", 1), "cert.1");
    }

    #[test]
    fn test_indexed_file_name_dot_in_directory_only() {
        // The dot in the directory name is not an extension separator
        assert_eq!(indexed_file_name("certs.d/qr", 2), "certs.d/qr.2");
    }

    #[test]
    fn test_export_writes_sequential_png_files() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("cert.png");
        let template = template.to_str().unwrap();

        let (record, _) = decode_next(LEAF_PEM.as_bytes()).unwrap();
        for index in 0..3 {
            export_qr(&record, template, index).unwrap();
        }

        for name in ["cert.png", "cert.1.png", "cert.2.png"] {
            let data = std::fs::read(dir.path().join(name)).unwrap();
            assert_eq!(&data[..4], &PNG_MAGIC);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_export_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cert.png");

        let (record, _) = decode_next(LEAF_PEM.as_bytes()).unwrap();
        export_qr(&record, dest.to_str().unwrap(), 0).unwrap();

        let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_export_to_unwritable_path_is_an_error() {
        let (record, _) = decode_next(LEAF_PEM.as_bytes()).unwrap();
        let result = export_qr(&record, "/nonexistent-dir/cert.png", 0);
        assert!(matches!(result, Err(CertPrintError::QrWrite(_))));
    }
}
