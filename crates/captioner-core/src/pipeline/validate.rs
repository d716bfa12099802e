//! Upload validation before decoding.

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Validates uploaded bytes before decode.
pub struct UploadValidator {
    limits: LimitsConfig,
}

impl UploadValidator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - Upload is not empty
    /// - Upload size is within limits
    /// - Payload has the magic bytes of a decodable format
    pub fn validate(&self, bytes: &[u8], name: &str) -> Result<(), PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::EmptyUpload {
                name: name.to_string(),
            });
        }

        let len = bytes.len() as u64;
        if len > self.limits.max_file_size_bytes() {
            return Err(PipelineError::FileTooLarge {
                name: name.to_string(),
                size_mb: len / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        if !Self::is_valid_image_header(bytes) {
            return Err(PipelineError::UnsupportedFormat {
                name: name.to_string(),
                format: Self::describe_extension(name),
            });
        }

        Ok(())
    }

    fn describe_extension(name: &str) -> String {
        std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string()
    }

    /// Check if the leading bytes match known image formats.
    fn is_valid_image_header(header: &[u8]) -> bool {
        if header.len() < 4 {
            return false;
        }

        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return true;
        }

        // PNG: 89 50 4E 47
        if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            return true;
        }

        // GIF: GIF8
        if header.starts_with(b"GIF8") {
            return true;
        }

        // WebP: RIFF....WEBP
        if header.starts_with(b"RIFF") {
            return header.len() >= 12 && &header[8..12] == b"WEBP";
        }

        // BMP: BM
        if header.starts_with(b"BM") {
            return true;
        }

        // TIFF: II (little-endian) or MM (big-endian) followed by version 42
        // HEIF/AVIF (ftyp box) and anything else has no decoder in this build.
        header.starts_with(&[b'I', b'I', 0x2A, 0x00]) || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> UploadValidator {
        UploadValidator::new(LimitsConfig::default())
    }

    #[test]
    fn test_magic_bytes_jpeg() {
        let header = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(UploadValidator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_png() {
        let header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert!(UploadValidator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_webp() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert!(UploadValidator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_riff_non_webp_rejected() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'A', b'V', b'E'];
        assert!(!UploadValidator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_tiff() {
        assert!(UploadValidator::is_valid_image_header(&[b'I', b'I', 0x2A, 0x00]));
        assert!(UploadValidator::is_valid_image_header(&[b'M', b'M', 0x00, 0x2A]));
        assert!(!UploadValidator::is_valid_image_header(&[b'I', b'I', 0x00, 0x00]));
    }

    #[test]
    fn test_heif_family_rejected() {
        let heic = [0, 0, 0, 0x18, b'f', b't', b'y', b'p', b'h', b'e', b'i', b'c'];
        let avif = [0, 0, 0, 0x1C, b'f', b't', b'y', b'p', b'a', b'v', b'i', b'f'];
        assert!(!UploadValidator::is_valid_image_header(&heic));
        assert!(!UploadValidator::is_valid_image_header(&avif));

        let err = validator().validate(&heic, "photo.heic").unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { ref format, .. } if format == "heic"));
    }

    #[test]
    fn test_magic_bytes_invalid() {
        assert!(!UploadValidator::is_valid_image_header(b"hello world!"));
        assert!(!UploadValidator::is_valid_image_header(&[0xFF, 0xD8]));
    }

    #[test]
    fn test_validate_rejects_empty_upload() {
        let err = validator().validate(&[], "empty.jpg").unwrap_err();
        assert!(matches!(err, PipelineError::EmptyUpload { .. }));
    }

    #[test]
    fn test_validate_rejects_oversize_upload() {
        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let mut bytes = vec![0u8; 2 * 1024 * 1024];
        bytes[..4].copy_from_slice(&[0x89, b'P', b'N', b'G']);

        let err = UploadValidator::new(limits).validate(&bytes, "big.png").unwrap_err();
        match err {
            PipelineError::FileTooLarge { size_mb, max_mb, .. } => {
                assert_eq!(size_mb, 2);
                assert_eq!(max_mb, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_reports_extension_for_unknown_format() {
        let err = validator().validate(b"%PDF-1.7 ...", "scan.pdf").unwrap_err();
        match err {
            PipelineError::UnsupportedFormat { name, format } => {
                assert_eq!(name, "scan.pdf");
                assert_eq!(format, "pdf");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
