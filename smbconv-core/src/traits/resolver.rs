//! String token resolution interface

use crate::format::Guid;

/// Source of producer string tokens
///
/// Records carry 16-bit tokens instead of text. A token is only meaningful
/// together with the producer that issued it. Token 0 never resolves.
pub trait StringResolver {
    /// UCS-2 text for `token` issued by `producer`, if known
    fn resolve(&self, producer: &Guid, token: u16) -> Option<&[u16]>;
}

/// Resolver that knows no strings
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStrings;

impl StringResolver for NoStrings {
    fn resolve(&self, _producer: &Guid, _token: u16) -> Option<&[u16]> {
        None
    }
}
