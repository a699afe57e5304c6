//! Read-length sweep over random substrings of a reference.
//!
//! For each genome length in the configured range, several substrings are
//! sampled from the reference. Each one is cut into sliding-window reads of
//! increasing length until the reads reassemble the substring exactly. The
//! smallest such read length is recorded as a [`SweepPoint`].

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::assemble::assemble_fragments;
use crate::fragments::sliding_window;

/// Parameters for a sweep run.
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    /// Smallest substring length sampled (inclusive).
    pub min_genome_len: usize,
    /// Largest substring length sampled (exclusive).
    pub max_genome_len: usize,
    /// Substrings sampled per genome length.
    pub trials: usize,
    /// Seed for offset sampling.
    pub seed: u64,
    /// Upper bound (exclusive) on the sampled start offset.
    pub max_offset: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min_genome_len: 10,
            max_genome_len: 400,
            trials: 20,
            seed: 73,
            max_offset: 5000,
        }
    }
}

/// A substring length and the smallest read length that reassembled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SweepPoint {
    pub genome_len: usize,
    pub read_len: usize,
}

/// Smallest read length whose sliding windows reassemble `source` exactly.
///
/// Read lengths are tried from 2 while `read_len < source.len() - 1`.
/// Failures at one length are logged and the next length is tried.
pub fn min_assemblable_read_len(source: &str) -> Option<usize> {
    let upper = source.len().saturating_sub(1);
    (2..upper).find(|&read_len| {
        let reads = sliding_window(source, read_len);
        match assemble_fragments(&reads, read_len) {
            Ok(assembled) => assembled == source,
            Err(error) => {
                debug!("read_len {read_len} on {} bp: {error}", source.len());
                false
            }
        }
    })
}

/// Run the sweep over `reference`, which must already be upper-cased.
///
/// Substrings that are not ASCII record no point.
pub fn run_sweep(reference: &str, config: &SweepConfig) -> Vec<SweepPoint> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut points = Vec::new();

    for genome_len in config.min_genome_len..config.max_genome_len {
        if genome_len > reference.len() {
            info!(
                "Stopping sweep at {genome_len} bp: reference is only {} bp",
                reference.len()
            );
            break;
        }
        let offset_bound = config.max_offset.clamp(1, reference.len() - genome_len + 1);
        let offsets: Vec<usize> = (0..config.trials)
            .map(|_| rng.gen_range(0..offset_bound))
            .collect();

        let evaluate = |offset: &usize| {
            // Offsets landing inside a multibyte char are skipped.
            let source = reference.get(*offset..*offset + genome_len)?;
            min_assemblable_read_len(source).map(|read_len| SweepPoint {
                genome_len,
                read_len,
            })
        };

        #[cfg(feature = "parallel")]
        let found: Vec<SweepPoint> = offsets.par_iter().filter_map(evaluate).collect();
        #[cfg(not(feature = "parallel"))]
        let found: Vec<SweepPoint> = offsets.iter().filter_map(evaluate).collect();

        debug!(
            "genome_len {genome_len}: {}/{} trials assembled",
            found.len(),
            config.trials
        );
        points.extend(found);
    }

    info!("Sweep recorded {} points", points.len());
    points
}

/// Append points as `genome_len<TAB>read_len` lines, creating the file if needed.
pub fn append_points(path: &Path, points: &[SweepPoint]) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for point in points {
        writeln!(writer, "{}\t{}", point.genome_len, point.read_len)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_smallest_unique_overlap_length() {
        // Length 2 closes into a circuit A->C->T->G->A and loses the last base.
        assert_eq!(min_assemblable_read_len("ACTGA"), Some(3));
        assert_eq!(min_assemblable_read_len("GGCGTGG"), Some(4));
    }

    #[test]
    fn short_or_repetitive_sources_have_no_answer() {
        assert_eq!(min_assemblable_read_len("ACT"), None);
        assert_eq!(min_assemblable_read_len("AAAAAAAA"), None);
    }

    #[test]
    fn sweep_is_deterministic_for_a_seed() {
        let reference = "ACGTTGCAAGCTTACGGATCCATGCAGTCAGTTGACCATGGTACCGATC".repeat(4);
        let config = SweepConfig {
            min_genome_len: 10,
            max_genome_len: 16,
            trials: 3,
            seed: 7,
            max_offset: 100,
        };

        let first = run_sweep(&reference, &config);
        let second = run_sweep(&reference, &config);
        assert_eq!(first, second);
        assert!(!first.is_empty());
        for point in &first {
            assert!(point.read_len >= 2 && point.read_len < point.genome_len - 1);
        }
    }

    #[test]
    fn sweep_stops_when_reference_is_too_short() {
        let config = SweepConfig {
            min_genome_len: 10,
            max_genome_len: 50,
            trials: 1,
            ..SweepConfig::default()
        };
        let points = run_sweep("ACGTTGCAAGCT", &config);
        assert!(points.iter().all(|p| p.genome_len <= 12));
    }

    #[test]
    fn multibyte_reference_does_not_panic() {
        let reference = format!(
            "ACGTTGCAAG\u{e9}CTTACGGATCCATGCAGTCAG{}",
            "TTGACCATGG".repeat(3)
        );
        let config = SweepConfig {
            min_genome_len: 10,
            max_genome_len: 14,
            trials: 20,
            seed: 73,
            max_offset: 5000,
        };

        let points = run_sweep(&reference, &config);
        assert!(points.iter().all(|p| p.genome_len < 14));
    }

    #[test]
    fn appends_tab_separated_points() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let points = [
            SweepPoint {
                genome_len: 10,
                read_len: 4,
            },
            SweepPoint {
                genome_len: 11,
                read_len: 5,
            },
        ];
        append_points(tmp.path(), &points[..1]).unwrap();
        append_points(tmp.path(), &points[1..]).unwrap();

        let written = std::fs::read_to_string(tmp.path()).unwrap();
        assert_eq!(written, "10\t4\n11\t5\n");
    }
}
