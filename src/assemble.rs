//! Turning Eulerian walks back into sequences.

use log::debug;

use crate::error::{AssemblyError, Result};
use crate::graph::DeBruijnBuilder;
use crate::kmer::PackedKmer;

/// Spell out the sequence described by a walk of overlapping node labels.
///
/// Consecutive labels overlap by all but one symbol, so the first label is
/// taken whole and every later label contributes only its last symbol.
pub fn assemble<S: AsRef<str>>(walk: &[S]) -> Result<String> {
    let (head, rest) = walk.split_first().ok_or(AssemblyError::EmptyWalk)?;
    let head = head.as_ref();

    let mut sequence = String::with_capacity(head.len() + rest.len());
    sequence.push_str(head);
    sequence.extend(rest.iter().filter_map(|label| label.as_ref().chars().last()));
    Ok(sequence)
}

/// Assemble a set of equal-length fragments end to end.
///
/// Fragments are strictly encoded, so a fragment with symbols outside
/// `ACTG` is rejected rather than silently shortened.
pub fn assemble_fragments<S: AsRef<str>>(fragments: &[S], k: usize) -> Result<String> {
    let mut builder = DeBruijnBuilder::<PackedKmer>::new(k);
    for fragment in fragments {
        builder.insert(&PackedKmer::encode_strict(fragment.as_ref())?)?;
    }
    let graph = builder.build();
    let walk = graph.compute_walk()?;
    let sequence = assemble(&walk)?;
    debug!(
        "Assembled {} fragments (k = {}) into {} bp",
        fragments.len(),
        k,
        sequence.len()
    );
    Ok(sequence)
}
