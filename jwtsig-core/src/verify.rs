//! RSASSA-PKCS1-v1_5 verification of token signatures
//!
//! Structural problems with the inputs (an unusable key, a signature that does not decode or has
//! the wrong length) are errors. A well-formed signature that does not match is an ordinary
//! [VerificationResult::Invalid].

use std::fmt;

use rsa::pkcs1v15::{Signature, VerifyingKey};
use sha2::{Sha256, Sha384, Sha512};
use signature::hazmat::PrehashVerifier;

use crate::model::{
    crypto::{DigestAlgorithm, KeyLoadError, PublicKey},
    message::{EncodedSegment, SignedMessage},
    signature::{EncodedSignature, MalformedSignature, RawSignature},
    token::{CompactToken, TokenError},
};

/// Outcome of a signature check over well-formed inputs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerificationResult {
    /// The signature was produced by the key's private counterpart using `digest`
    Valid { digest: DigestAlgorithm },
    /// The signature does not match the message under any of the digests tried
    Invalid,
}

/// A public key bound to the one digest algorithm that was agreed for it out-of-band.
///
/// Nothing in a token can change which algorithm a `Verifier` runs.
#[derive(Clone, Debug)]
pub struct Verifier {
    key: PublicKey,
    digest: DigestAlgorithm,
}

/// Any failure that prevents a signature check from being performed at all
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Failed to load public key: {0}")]
    KeyLoad(#[from] KeyLoadError),
    #[error("Malformed signature: {0}")]
    MalformedSignature(#[from] MalformedSignature),
    #[error("Malformed token: {0}")]
    MalformedToken(#[from] TokenError),
}

/// Check that `signature` is an RSA PKCS#1 v1.5 signature of `message` under `key`, hashing the
/// message with `digest`
pub fn verify(
    message: &SignedMessage,
    signature: &RawSignature,
    key: &PublicKey,
    digest: DigestAlgorithm,
) -> Result<VerificationResult, MalformedSignature> {
    verify_any(message, signature, key, &[digest])
}

/// Check the signature against each candidate digest in order, reporting the first that matches.
///
/// The signature length is checked once before any candidate is tried. An empty candidate list
/// always yields [VerificationResult::Invalid].
pub fn verify_any(
    message: &SignedMessage,
    signature: &RawSignature,
    key: &PublicKey,
    candidates: &[DigestAlgorithm],
) -> Result<VerificationResult, MalformedSignature> {
    let expected = key.modulus_len();
    if signature.len() != expected {
        log::warn!(
            "Rejecting {} byte signature for a {}-bit key",
            signature.len(),
            key.bits()
        );
        return Err(MalformedSignature::LengthMismatch {
            expected,
            actual: signature.len(),
        });
    }

    log::trace!("Signing input: {:?}", message);

    let sig =
        Signature::try_from(signature.as_bytes()).map_err(MalformedSignature::Unparseable)?;

    for &digest in candidates {
        log::debug!(
            "Checking {} byte message against {}-bit key with {}",
            message.len(),
            key.bits(),
            digest
        );

        let hashed = digest.digest(message.as_bytes());
        let rsa = key.as_rsa().clone();
        let outcome = match digest {
            DigestAlgorithm::Sha256 => {
                VerifyingKey::<Sha256>::new(rsa).verify_prehash(&hashed, &sig)
            }
            DigestAlgorithm::Sha384 => {
                VerifyingKey::<Sha384>::new(rsa).verify_prehash(&hashed, &sig)
            }
            DigestAlgorithm::Sha512 => {
                VerifyingKey::<Sha512>::new(rsa).verify_prehash(&hashed, &sig)
            }
        };

        match outcome {
            Ok(()) => {
                log::info!("Signature is valid ({})", digest);
                return Ok(VerificationResult::Valid { digest });
            }
            Err(e) => log::debug!("Signature did not verify with {}: {}", digest, e),
        }
    }

    log::info!("Signature is invalid");
    Ok(VerificationResult::Invalid)
}

impl VerificationResult {
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// The digest the signature matched under, if it matched at all
    pub const fn digest(&self) -> Option<DigestAlgorithm> {
        match self {
            Self::Valid { digest } => Some(*digest),
            Self::Invalid => None,
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid { digest } => write!(f, "valid ({})", digest),
            Self::Invalid => f.write_str("invalid"),
        }
    }
}

impl Verifier {
    pub const fn new(key: PublicKey, digest: DigestAlgorithm) -> Self {
        Self { key, digest }
    }

    /// Parse a PEM public key and bind it to `digest`
    pub fn from_pem(pem: &[u8], digest: DigestAlgorithm) -> Result<Self, KeyLoadError> {
        PublicKey::from_pem(pem).map(|key| Self::new(key, digest))
    }

    /// Verify a signature over separately supplied header and payload segments
    pub fn verify_parts(
        &self,
        header: EncodedSegment<'_>,
        payload: EncodedSegment<'_>,
        signature: EncodedSignature<'_>,
    ) -> Result<VerificationResult, VerifyError> {
        let message = SignedMessage::assemble(header, payload);
        let signature = signature.decode()?;

        verify(&message, &signature, &self.key, self.digest).map_err(Into::into)
    }

    /// Split a compact `header.payload.signature` token and verify it
    pub fn verify_token(&self, token: &str) -> Result<VerificationResult, VerifyError> {
        let token = CompactToken::parse(token)?;
        self.verify_parts(token.header, token.payload, token.signature)
    }
}
