//! HMAC-SHA256 signatures of gateway confirmations.

use std::fmt::Write as _;

use hmac::{Hmac, Mac as _};
use sha2::Sha256;

/// Signs the provided payload with the given shared secret, returning the
/// lowercase hex digest.
#[must_use]
pub fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any size");
    mac.update(payload);

    let digest = mac.finalize().into_bytes();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        write!(hex, "{byte:02x}").expect("infallible");
    }
    hex
}

/// Checks the provided signature against the payload and shared secret.
///
/// The signature must match the recomputed digest exactly.
#[must_use]
pub fn verify(secret: &str, payload: &[u8], provided: &str) -> bool {
    sign(secret, payload) == provided
}

#[cfg(test)]
mod spec {
    use super::{sign, verify};

    // Vectors from RFC 4231.
    #[test]
    fn signs_rfc4231_vectors() {
        let key = String::from_utf8(vec![0x0b; 20]).unwrap();
        assert_eq!(
            sign(&key, b"Hi There"),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7",
        );

        assert_eq!(
            sign("Jefe", b"what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843",
        );
    }

    #[test]
    fn verifies_exact_match_only() {
        let payload = b"order_abc|pay_def";
        let good = sign("secret", payload);

        assert!(verify("secret", payload, &good));
        assert!(!verify("secret", payload, &good.to_uppercase()));
        assert!(!verify("secret", b"order_abc|pay_xyz", &good));
        assert!(!verify("other", payload, &good));
        assert!(!verify("secret", payload, ""));
    }
}
