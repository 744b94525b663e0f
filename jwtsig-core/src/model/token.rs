//! Splitting of compact `header.payload.signature` tokens

use super::{message::EncodedSegment, signature::EncodedSignature};

/// A compact serialized token broken into its three period separated parts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompactToken<'a> {
    pub header: EncodedSegment<'a>,
    pub payload: EncodedSegment<'a>,
    pub signature: EncodedSignature<'a>,
}

impl<'a> CompactToken<'a> {
    /// Split a token on its two periods. The parts are borrowed as-is, surrounding whitespace
    /// included.
    pub fn parse(token: &'a str) -> Result<Self, TokenError> {
        let mut parts = token.split('.');

        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(header), Some(payload), Some(signature), None) => Ok(Self {
                header: EncodedSegment::new(header),
                payload: EncodedSegment::new(payload),
                signature: EncodedSignature::new(signature),
            }),
            _ => Err(TokenError::SegmentCount(token.split('.').count())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Compact token has {0} period separated segments, expected 3")]
    SegmentCount(usize),
}
