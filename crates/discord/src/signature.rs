use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("public key is not a 32-byte hex string: {0}")]
    InvalidPublicKey(String),
    #[error("signature header is missing")]
    MissingSignature,
    #[error("signature is not a 64-byte hex string")]
    MalformedSignature,
    #[error("signature does not match request body")]
    Mismatch,
}

/// Checks Ed25519 signatures over `timestamp || body`.
#[derive(Clone, Debug)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    pub fn from_hex(public_key: &str) -> Result<Self, SignatureError> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|error| SignatureError::InvalidPublicKey(error.to_string()))?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SignatureError::InvalidPublicKey("expected 32 bytes".to_owned()))?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|error| SignatureError::InvalidPublicKey(error.to_string()))?;
        Ok(Self { key })
    }

    pub fn verify(
        &self,
        signature_hex: Option<&str>,
        timestamp: Option<&str>,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        let (signature_hex, timestamp) = match (signature_hex, timestamp) {
            (Some(signature), Some(timestamp)) => (signature, timestamp),
            _ => return Err(SignatureError::MissingSignature),
        };

        let bytes =
            hex::decode(signature_hex.trim()).map_err(|_| SignatureError::MalformedSignature)?;
        let bytes: [u8; 64] =
            bytes.as_slice().try_into().map_err(|_| SignatureError::MalformedSignature)?;
        let signature = Signature::from_bytes(&bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key.verify(&message, &signature).map_err(|_| SignatureError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};

    use super::{SignatureError, SignatureVerifier};

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::from_hex(&hex::encode(signing_key().verifying_key().to_bytes()))
            .expect("valid public key")
    }

    fn sign(timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(signing_key().sign(&message).to_bytes())
    }

    #[test]
    fn accepts_signature_over_timestamp_and_body() {
        let body = br#"{"type":1}"#;
        let signature = sign("1700000000", body);

        assert_eq!(verifier().verify(Some(&signature), Some("1700000000"), body), Ok(()));
    }

    #[test]
    fn rejects_tampered_body_or_timestamp() {
        let body = br#"{"type":1}"#;
        let signature = sign("1700000000", body);

        assert_eq!(
            verifier().verify(Some(&signature), Some("1700000000"), br#"{"type":2}"#),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verifier().verify(Some(&signature), Some("1700000001"), body),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        assert_eq!(
            verifier().verify(None, Some("1"), b"{}"),
            Err(SignatureError::MissingSignature)
        );
        assert_eq!(
            verifier().verify(Some("zz"), Some("1"), b"{}"),
            Err(SignatureError::MalformedSignature)
        );
        assert_eq!(
            verifier().verify(Some("abcd"), Some("1"), b"{}"),
            Err(SignatureError::MalformedSignature)
        );
    }

    #[test]
    fn public_key_must_be_32_hex_bytes() {
        assert!(matches!(
            SignatureVerifier::from_hex("not-hex"),
            Err(SignatureError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            SignatureVerifier::from_hex("abcd"),
            Err(SignatureError::InvalidPublicKey(_))
        ));
    }
}
