//! Magic-byte detection for the image containers the reader serves.

/// Recognised image containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Heif,
    Avif,
    Jxl,
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JXL_CONTAINER: &[u8] = b"\x00\x00\x00\x0cJXL \r\n\x87\n";
const JXL_CODESTREAM: &[u8] = b"\xff\x0a";

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Heif => "image/heif",
            ImageFormat::Avif => "image/avif",
            ImageFormat::Jxl => "image/jxl",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Heif => "heic",
            ImageFormat::Avif => "avif",
            ImageFormat::Jxl => "jxl",
        }
    }
}

/// Identify the container from the leading bytes.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(b"\xff\xd8") {
        return Some(ImageFormat::Jpeg);
    }
    if bytes.starts_with(PNG_SIGNATURE) {
        return Some(ImageFormat::Png);
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some(ImageFormat::Gif);
    }
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some(ImageFormat::Webp);
    }
    // ISO-BMFF: [box size][ftyp][major brand]
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        match &bytes[8..11] {
            b"hei" | b"hev" => return Some(ImageFormat::Heif),
            b"avi" => return Some(ImageFormat::Avif),
            _ => {}
        }
    }
    if bytes.starts_with(JXL_CODESTREAM) || bytes.starts_with(JXL_CONTAINER) {
        return Some(ImageFormat::Jxl);
    }
    None
}

pub fn looks_like_image(bytes: &[u8]) -> bool {
    detect_format(bytes).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn detects_canonical_headers() {
        assert_eq!(detect_format(b"\xff\xd8"), Some(ImageFormat::Jpeg));
        assert_eq!(detect_format(PNG_SIGNATURE), Some(ImageFormat::Png));
        assert_eq!(detect_format(b"GIF87a\x01\x00"), Some(ImageFormat::Gif));
        assert_eq!(detect_format(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(
            detect_format(b"RIFF\x24\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(
            detect_format(b"\x00\x00\x00\x18ftypheic\x00\x00\x00\x00"),
            Some(ImageFormat::Heif)
        );
        assert_eq!(
            detect_format(b"\x00\x00\x00\x18ftyphevc\x00\x00\x00\x00"),
            Some(ImageFormat::Heif)
        );
        assert_eq!(
            detect_format(b"\x00\x00\x00\x1cftypavif\x00\x00\x00\x00"),
            Some(ImageFormat::Avif)
        );
        assert_eq!(detect_format(b"\xff\x0a\xfa\x7f"), Some(ImageFormat::Jxl));
        assert_eq!(detect_format(JXL_CONTAINER), Some(ImageFormat::Jxl));
    }

    #[test]
    fn rejects_zeros_and_near_misses() {
        assert!(!looks_like_image(&[0u8; 16]));
        assert!(!looks_like_image(&[]));
        assert!(!looks_like_image(b"\xff"));
        assert!(!looks_like_image(b"\x89PNG\r\n\x1a"));
        assert!(!looks_like_image(b"GIF88a"));
        assert!(!looks_like_image(b"RIFF\x24\x00\x00\x00WAVEfmt "));
        assert!(!looks_like_image(b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00"));
        assert!(!looks_like_image(b"\x00\x00\x00\x18ftyphei"), "brand needs a full box header");
    }

    #[test]
    fn mime_and_extension() {
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Avif.mime_type(), "image/avif");
        assert_eq!(ImageFormat::Jxl.extension(), "jxl");
    }

    proptest! {
        #[test]
        fn trailing_bytes_do_not_matter(tail in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut png = PNG_SIGNATURE.to_vec();
            png.extend_from_slice(&tail);
            prop_assert_eq!(detect_format(&png), Some(ImageFormat::Png));
        }
    }
}
