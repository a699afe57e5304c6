//! Capability contract for fixed-alphabet sequences that can be split into
//! overlapping halves.

/// A sequence with a prefix (itself minus the last symbol) and a suffix
/// (itself minus the first symbol).
///
/// The De Bruijn graph is generic over this trait rather than over a
/// concrete encoding. `prefix` and `suffix` are only meaningful when
/// `size() >= 2`; the graph never calls them on anything shorter.
pub trait SequenceUnit: Sized {
    /// Copy of the sequence without its last symbol.
    fn prefix(&self) -> Self;

    /// Copy of the sequence without its first symbol.
    fn suffix(&self) -> Self;

    /// Number of symbols.
    fn size(&self) -> usize;
}

impl SequenceUnit for String {
    fn prefix(&self) -> Self {
        let mut chars = self.chars();
        chars.next_back();
        chars.as_str().to_string()
    }

    fn suffix(&self) -> Self {
        let mut chars = self.chars();
        chars.next();
        chars.as_str().to_string()
    }

    fn size(&self) -> usize {
        self.chars().count()
    }
}
