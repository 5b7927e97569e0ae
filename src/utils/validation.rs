// Upload validation: the browser form checks the same rules, but the server is
// the only place they are actually enforced.

use crate::utils::error::AppError;
use image::ImageFormat;
use lazy_static::lazy_static;
use regex::Regex;

/// Max accepted profile picture size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

pub const MSG_MISSING_FIELDS: &str = "Please fill all fields and select an image";
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email";
pub const MSG_FILE_TOO_LARGE: &str = "File size should be less than 5MB";
pub const MSG_INVALID_TYPE: &str = "Only image files are allowed (jpeg, jpg, png, gif, webp)";
pub const MSG_CONTENT_MISMATCH: &str = "File content does not match its declared image type";
pub const MSG_EMPTY_FILE: &str = "Uploaded file is empty";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid");
}

/// Image formats accepted for profile pictures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
        }
    }

    /// Maps a declared MIME type onto a kind. `image/jpg` is a common alias.
    fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/gif" => Some(ImageKind::Gif),
            "image/webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(mime))
}

/// Trims the submitted name and email and checks both are present and the
/// email is well-formed.
pub fn validate_profile_fields(name: &str, email: &str) -> Result<(String, String), AppError> {
    let name = name.trim();
    let email = email.trim();

    if name.is_empty() || email.is_empty() {
        return Err(AppError::InvalidRequest(MSG_MISSING_FIELDS.to_string()));
    }

    if !is_valid_email(email) {
        return Err(AppError::InvalidRequest(MSG_INVALID_EMAIL.to_string()));
    }

    Ok((name.to_string(), email.to_string()))
}

/// Identifies the image format from its leading bytes.
pub fn sniff_image(bytes: &[u8]) -> Option<ImageKind> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Jpeg => Some(ImageKind::Jpeg),
        ImageFormat::Png => Some(ImageKind::Png),
        ImageFormat::Gif => Some(ImageKind::Gif),
        ImageFormat::WebP => Some(ImageKind::Webp),
        _ => None,
    }
}

/// Validates a fully-read upload: size, declared type, and actual content.
pub fn validate_image(declared_mime: Option<&str>, bytes: &[u8]) -> Result<ImageKind, AppError> {
    if bytes.is_empty() {
        return Err(AppError::InvalidRequest(MSG_EMPTY_FILE.to_string()));
    }

    if bytes.len() > MAX_FILE_SIZE {
        return Err(AppError::PayloadTooLarge(MSG_FILE_TOO_LARGE.to_string()));
    }

    let declared = declared_mime
        .filter(|m| is_allowed_mime(m))
        .and_then(ImageKind::from_mime)
        .ok_or_else(|| AppError::InvalidRequest(MSG_INVALID_TYPE.to_string()))?;

    match sniff_image(bytes) {
        Some(actual) if actual == declared => Ok(actual),
        _ => Err(AppError::InvalidRequest(MSG_CONTENT_MISMATCH.to_string())),
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("ax.com"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@@x.com"));
    }

    #[test]
    fn test_profile_fields_are_trimmed() {
        let (name, email) = validate_profile_fields("  Ann ", " a@x.com\n").unwrap();
        assert_eq!(name, "Ann");
        assert_eq!(email, "a@x.com");
    }

    #[test]
    fn test_profile_fields_rejects_blank_and_bad_email() {
        let err = validate_profile_fields("   ", "a@x.com").unwrap_err();
        assert_eq!(err.public_message(), MSG_MISSING_FIELDS);

        let err = validate_profile_fields("Ann", "not-an-email").unwrap_err();
        assert_eq!(err.public_message(), MSG_INVALID_EMAIL);
    }

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(sniff_image(PNG_BYTES), Some(ImageKind::Png));
        assert_eq!(sniff_image(JPEG_BYTES), Some(ImageKind::Jpeg));
        assert_eq!(sniff_image(GIF_BYTES), Some(ImageKind::Gif));
        assert_eq!(sniff_image(WEBP_BYTES), Some(ImageKind::Webp));
        assert_eq!(sniff_image(b"%PDF-1.7 not an image"), None);
    }

    #[test]
    fn test_validate_image_accepts_jpg_alias() {
        assert_eq!(validate_image(Some("image/jpg"), JPEG_BYTES).unwrap(), ImageKind::Jpeg);
        assert_eq!(validate_image(Some("IMAGE/PNG"), PNG_BYTES).unwrap(), ImageKind::Png);
    }

    #[test]
    fn test_validate_image_rejects_bad_type() {
        let err = validate_image(Some("application/pdf"), PNG_BYTES).unwrap_err();
        assert_eq!(err.public_message(), MSG_INVALID_TYPE);

        let err = validate_image(None, PNG_BYTES).unwrap_err();
        assert_eq!(err.public_message(), MSG_INVALID_TYPE);
    }

    #[test]
    fn test_validate_image_rejects_mismatched_content() {
        let err = validate_image(Some("image/png"), GIF_BYTES).unwrap_err();
        assert_eq!(err.public_message(), MSG_CONTENT_MISMATCH);

        let err = validate_image(Some("image/png"), b"<html>hello</html>").unwrap_err();
        assert_eq!(err.public_message(), MSG_CONTENT_MISMATCH);
    }

    #[test]
    fn test_validate_image_rejects_oversize_and_empty() {
        let mut big = PNG_BYTES.to_vec();
        big.resize(MAX_FILE_SIZE + 1, 0);
        let err = validate_image(Some("image/png"), &big).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));

        let err = validate_image(Some("image/png"), &[]).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(err.public_message(), MSG_EMPTY_FILE);

        let mut exact = PNG_BYTES.to_vec();
        exact.resize(MAX_FILE_SIZE, 0);
        assert_eq!(validate_image(Some("image/png"), &exact).unwrap(), ImageKind::Png);
    }
}
