//! Public keys and digest algorithms used to check RS-family token signatures

use std::{fmt, path::Path, str::FromStr};

use digest::Digest;
use rsa::{
    pkcs1::DecodeRsaPublicKey,
    pkcs8::DecodePublicKey,
    traits::PublicKeyParts,
    RsaPublicKey,
};
use sha2::{Sha256, Sha384, Sha512};

/// An RSA public key that signatures are checked against
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: RsaPublicKey,
}

/// Hash function applied to the signed message before the RSA PKCS#1 v1.5 check.
///
/// This is always chosen by the party doing the verification, never read from the token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA-256, `RS256`
    #[default]
    Sha256,
    /// SHA-384, `RS384`
    Sha384,
    /// SHA-512, `RS512`
    Sha512,
}

impl PublicKey {
    /// Parse a PEM encoded public key, accepting either an X.509 `PUBLIC KEY` block or a PKCS#1
    /// `RSA PUBLIC KEY` block
    pub fn from_pem(bytes: &[u8]) -> Result<Self, KeyLoadError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(KeyLoadError::Empty);
        }

        let pem = std::str::from_utf8(bytes)?.trim();

        let inner = match RsaPublicKey::from_public_key_pem(pem) {
            Ok(key) => key,
            Err(spki) => match RsaPublicKey::from_pkcs1_pem(pem) {
                Ok(key) => key,
                Err(pkcs1) => return Err(KeyLoadError::Unrecognized { spki, pkcs1 }),
            },
        };

        let key = Self { inner };
        log::debug!("Loaded {}-bit RSA public key", key.bits());
        Ok(key)
    }

    /// Read and parse the PEM file at the given path
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, KeyLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| KeyLoadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_pem(&bytes)
    }

    /// Length of the key modulus in bytes, which every valid signature must match exactly
    pub fn modulus_len(&self) -> usize {
        self.inner.size()
    }

    /// Size of the key modulus in bits
    pub fn bits(&self) -> usize {
        self.inner.n().bits()
    }

    /// Get the underlying RSA key
    pub const fn as_rsa(&self) -> &RsaPublicKey {
        &self.inner
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(inner: RsaPublicKey) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

impl DigestAlgorithm {
    /// Every supported algorithm, strongest last
    pub const ALL: [Self; 3] = [Self::Sha256, Self::Sha384, Self::Sha512];

    /// The JWS `alg` name of RSA PKCS#1 v1.5 with this digest
    pub const fn jws_name(&self) -> &'static str {
        match self {
            Self::Sha256 => "RS256",
            Self::Sha384 => "RS384",
            Self::Sha512 => "RS512",
        }
    }

    /// Hash a message with this algorithm
    pub fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(message).to_vec(),
            Self::Sha384 => Sha384::digest(message).to_vec(),
            Self::Sha512 => Sha512::digest(message).to_vec(),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jws_name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = UnknownDigestAlgorithm;

    /// Accepts JWS names case-insensitively, along with the bare hash names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rs256" | "sha256" | "sha-256" => Ok(Self::Sha256),
            "rs384" | "sha384" | "sha-384" => Ok(Self::Sha384),
            "rs512" | "sha512" | "sha-512" => Ok(Self::Sha512),
            _ => Err(UnknownDigestAlgorithm(s.to_owned())),
        }
    }
}

/// Failed to obtain a usable public key
#[derive(Debug, thiserror::Error)]
pub enum KeyLoadError {
    #[error("Failed to read public key file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Public key is empty")]
    Empty,
    #[error("Public key is not valid UTF-8 text: {0}")]
    NotText(#[from] std::str::Utf8Error),
    #[error("Public key is neither an X.509 PEM key ({spki}) nor a PKCS#1 PEM key ({pkcs1})")]
    Unrecognized {
        spki: rsa::pkcs8::spki::Error,
        pkcs1: rsa::pkcs1::Error,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("Unsupported digest algorithm '{0}', expected one of RS256, RS384, RS512")]
pub struct UnknownDigestAlgorithm(pub String);
