//! # jwtsig
//!
//! Verification of RS256, RS384 and RS512 signatures over compact tokens. The signing input is
//! rebuilt byte-for-byte from the encoded header and payload, the signature is decoded from its
//! URL-safe transport encoding and checked against an RSA public key loaded from PEM.
//!
//! The digest algorithm is always supplied by the caller; the token header is never consulted.
//! Most uses go through [Verifier], which binds a key to its agreed algorithm.

pub mod model;
mod verify;

pub use rsa;
pub use model::crypto::{DigestAlgorithm, KeyLoadError, PublicKey};
pub use model::message::{EncodedSegment, SignedMessage};
pub use model::signature::{EncodedSignature, MalformedSignature, RawSignature};
pub use model::token::{CompactToken, TokenError};
pub use verify::{verify, verify_any, VerificationResult, Verifier, VerifyError};
