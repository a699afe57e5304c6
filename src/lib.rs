//! debruijn_rs: sequence reconstruction from fixed-length reads.
//!
//! Reads are packed two bits per base, inserted as edges of a De Bruijn
//! graph over their `(k - 1)`-length prefixes and suffixes, and walked with
//! an iterative Hierholzer traversal. The resulting Eulerian walk spells the
//! reconstructed sequence.

pub mod assemble;
pub mod error;
pub mod fragments;
pub mod graph;
pub mod kmer;
pub mod read_source;
pub mod sweep;
pub mod unit;

pub use assemble::{assemble, assemble_fragments};
pub use error::{AssemblyError, Infeasibility, Result};
pub use fragments::{sliding_window, windows_are_unique};
pub use graph::{DeBruijnBuilder, DeBruijnGraph, Eulerian, Node, NodeId};
pub use kmer::{Base, PackedKmer};
pub use read_source::{load_reference, read_sequences, ReadSourceError, SequenceFormat};
pub use sweep::{append_points, min_assemblable_read_len, run_sweep, SweepConfig, SweepPoint};
pub use unit::SequenceUnit;
