//! Transport decoding of token signatures

use base64::{
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

/// Character used to pad the base64 transport encoding to a multiple of four characters
const PAD: char = '=';

/// A signature as it appears in a token: URL-safe base64, with or without trailing padding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EncodedSignature<'a>(&'a str);

/// Signature bytes after transport decoding, big-endian as produced by the RSA signing primitive
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawSignature(Vec<u8>);

impl<'a> EncodedSignature<'a> {
    /// Decoder applied after padding has been restored, so only canonically padded input is
    /// accepted
    const DECODER: GeneralPurpose = GeneralPurpose::new(
        &base64::alphabet::URL_SAFE,
        GeneralPurposeConfig::new()
            .with_encode_padding(true)
            .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
    );

    pub const fn new(text: &'a str) -> Self {
        Self(text)
    }

    pub const fn as_str(&self) -> &'a str {
        self.0
    }

    /// Restore any padding stripped by the producer and decode to the raw signature bytes
    pub fn decode(&self) -> Result<RawSignature, MalformedSignature> {
        let padded = self.padded()?;
        let bytes = Self::DECODER.decode(padded.as_bytes())?;

        log::trace!("Decoded {} signature characters to {} bytes", self.0.len(), bytes.len());

        Ok(RawSignature(bytes))
    }

    /// Get the signature text padded to a multiple of four characters.
    ///
    /// Padding already present is accepted when it is no longer than the padding the text needs.
    fn padded(&self) -> Result<String, MalformedSignature> {
        let unpadded = self.0.trim_end_matches(PAD);
        let stripped = self.0.len() - unpadded.len();

        let missing = match unpadded.len() % 4 {
            0 => 0,
            2 => 2,
            3 => 1,
            _ => return Err(MalformedSignature::InvalidLength(unpadded.len())),
        };

        if stripped > missing {
            return Err(MalformedSignature::InvalidLength(self.0.len()));
        }

        let mut padded = String::with_capacity(unpadded.len() + missing);
        padded.push_str(unpadded);
        padded.extend(std::iter::repeat(PAD).take(missing));
        Ok(padded)
    }
}

impl<'a> From<&'a str> for EncodedSignature<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text)
    }
}

impl RawSignature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for RawSignature {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for RawSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The signature could not be turned into something the RSA primitive can check
#[derive(Debug, thiserror::Error)]
pub enum MalformedSignature {
    #[error("Signature is not valid URL-safe base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("Signature text of {0} characters is not a valid base64 length")]
    InvalidLength(usize),
    #[error("Decoded signature is {actual} bytes but the key modulus is {expected} bytes")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Signature bytes could not be read as an RSA signature: {0}")]
    Unparseable(signature::Error),
}
