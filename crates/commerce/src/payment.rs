//! Payment gateway signature verification.
//!
//! The gateway signs `"{gateway_order_id}|{gateway_payment_id}"` with
//! HMAC-SHA256 over a shared secret and sends the hex-encoded digest back
//! with the capture callback. We recompute and compare in constant time;
//! anything short of an exact match is a verification failure.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::{CommerceError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Verify a gateway payment signature.
///
/// # Errors
///
/// Returns `PaymentVerificationFailed` when the signature is not valid hex
/// or does not match the recomputed digest. The error carries no detail
/// about which check failed.
pub fn verify_signature(
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
    secret: &SecretString,
) -> Result<()> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| CommerceError::PaymentVerificationFailed)?;
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());

    let provided =
        hex::decode(signature).map_err(|_| CommerceError::PaymentVerificationFailed)?;

    // verify_slice is constant-time.
    mac.verify_slice(&provided)
        .map_err(|_| CommerceError::PaymentVerificationFailed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_accepts_matching_signature() {
        let secret = SecretString::from("k9#xQ2!mVr8@pL4z");
        let signature = sign("ord_781", "pay_313", "k9#xQ2!mVr8@pL4z");
        assert!(verify_signature("ord_781", "pay_313", &signature, &secret).is_ok());
    }

    #[test]
    fn test_rejects_tampered_payment_id() {
        let secret = SecretString::from("k9#xQ2!mVr8@pL4z");
        let signature = sign("ord_781", "pay_313", "k9#xQ2!mVr8@pL4z");
        let err = verify_signature("ord_781", "pay_999", &signature, &secret).unwrap_err();
        assert_eq!(err.code(), "payment_verification_failed");
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let secret = SecretString::from("k9#xQ2!mVr8@pL4z");
        let signature = sign("ord_781", "pay_313", "some-other-secret-value");
        assert!(verify_signature("ord_781", "pay_313", &signature, &secret).is_err());
    }

    #[test]
    fn test_rejects_non_hex_signature() {
        let secret = SecretString::from("k9#xQ2!mVr8@pL4z");
        let err = verify_signature("ord_781", "pay_313", "not-hex!", &secret).unwrap_err();
        assert_eq!(err.code(), "payment_verification_failed");
    }

    #[test]
    fn test_separator_is_part_of_message() {
        // "a|bc" and "ab|c" must not collide.
        let secret = SecretString::from("k9#xQ2!mVr8@pL4z");
        let signature = sign("a", "bc", "k9#xQ2!mVr8@pL4z");
        assert!(verify_signature("ab", "c", &signature, &secret).is_err());
    }
}
