//! Payment signatures
//!
//! The payment provider signs `{provider_order_id}|{provider_payment_id}` with the
//! shared secret using HMAC-SHA256 and sends the lowercase hex digest.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Signature verification errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signing secret is empty")]
    EmptySecret,

    #[error("signature is not valid hex")]
    Encoding,

    #[error("signature does not match")]
    Mismatch,
}

/// Build the signed message for a provider order and payment.
pub fn signature_payload(provider_order_id: &str, provider_payment_id: &str) -> Vec<u8> {
    format!("{provider_order_id}|{provider_payment_id}").into_bytes()
}

fn mac(secret: &[u8], provider_order_id: &str, provider_payment_id: &str) -> Result<HmacSha256, SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::EmptySecret);
    }

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_invalid| SignatureError::EmptySecret)?;
    mac.update(&signature_payload(provider_order_id, provider_payment_id));

    Ok(mac)
}

/// Sign a provider order and payment, returning the hex digest.
///
/// # Errors
///
/// Returns [`SignatureError::EmptySecret`] when `secret` is empty.
pub fn sign_payment(
    secret: &[u8],
    provider_order_id: &str,
    provider_payment_id: &str,
) -> Result<String, SignatureError> {
    let mac = mac(secret, provider_order_id, provider_payment_id)?;

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex signature in constant time.
///
/// # Errors
///
/// - [`SignatureError::EmptySecret`]: `secret` is empty.
/// - [`SignatureError::Encoding`]: `signature` is not hex.
/// - [`SignatureError::Mismatch`]: the digest differs.
pub fn verify_payment_signature(
    secret: &[u8],
    provider_order_id: &str,
    provider_payment_id: &str,
    signature: &str,
) -> Result<(), SignatureError> {
    let expected = hex::decode(signature.trim()).map_err(|_invalid| SignatureError::Encoding)?;

    mac(secret, provider_order_id, provider_payment_id)?
        .verify_slice(&expected)
        .map_err(|_mismatch| SignatureError::Mismatch)
}
