//! The byte sequence a token producer actually signed, assembled from the encoded header and
//! payload segments

use std::fmt;

/// Separator placed between the header and payload when the signing input is assembled
pub const SEGMENT_SEPARATOR: u8 = b'.';

/// One encoded part of a token, the header or the payload, exactly as the producer emitted it.
///
/// The contents are never decoded or normalized: a segment is only ever copied byte-for-byte into
/// a [SignedMessage].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EncodedSegment<'a>(&'a str);

/// The exact bytes that were signed: `header || "." || payload`
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SignedMessage {
    bytes: Vec<u8>,
}

impl<'a> EncodedSegment<'a> {
    /// Wrap a segment of text without inspecting it
    pub const fn new(text: &'a str) -> Self {
        Self(text)
    }

    /// Get the raw text of this segment
    pub const fn as_str(&self) -> &'a str {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> From<&'a str> for EncodedSegment<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text)
    }
}

impl SignedMessage {
    /// Join the header and payload segments with a single period.
    ///
    /// Either segment may be empty, the separator is always present.
    pub fn assemble(header: EncodedSegment<'_>, payload: EncodedSegment<'_>) -> Self {
        let mut bytes = Vec::with_capacity(header.len() + 1 + payload.len());
        bytes.extend_from_slice(header.as_str().as_bytes());
        bytes.push(SEGMENT_SEPARATOR);
        bytes.extend_from_slice(payload.as_str().as_bytes());

        log::debug!(
            "Assembled signing input of {} bytes ({} byte header, {} byte payload)",
            bytes.len(),
            header.len(),
            payload.len(),
        );

        Self { bytes }
    }

    /// Get the bytes that are fed to the digest function
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for SignedMessage {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for SignedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SignedMessage")
            .field(&String::from_utf8_lossy(&self.bytes))
            .finish()
    }
}
