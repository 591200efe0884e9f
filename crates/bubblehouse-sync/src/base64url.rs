//! Base64 helpers for token segments and the configured shared secret.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::{DecodeError, Engine as _};

/// Standard alphabet that accepts the secret with or without `=` padding.
const SECRET_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Base64url (RFC 4648 §5) without padding.
#[must_use]
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Inverse of [`encode`].
///
/// # Errors
///
/// Returns [`DecodeError`] when `input` is not unpadded base64url.
pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_NO_PAD.decode(input)
}

/// Decodes the shared secret as configured by the shop (standard alphabet).
///
/// # Errors
///
/// Returns [`DecodeError`] when the trimmed secret is not valid base64.
pub fn decode_secret(secret_base64: &str) -> Result<Vec<u8>, DecodeError> {
    SECRET_ENGINE.decode(secret_base64.trim())
}
