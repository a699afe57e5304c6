//! Loading reads and reference sequences from disk.
//!
//! FASTQ, FASTA and plain one-sequence-per-line files are supported, each
//! optionally gzip-compressed. All sequences are upper-cased on ingest.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bio::io::{fasta, fastq};
use flate2::read::MultiGzDecoder;

/// Errors returned while loading sequences.
#[derive(thiserror::Error, Debug)]
pub enum ReadSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("No sequence data in {0}")]
    Empty(String),
    #[error("Encountered non-UTF-8 symbols in sequence data")]
    NonUtf8,
    #[error("Non-ASCII symbol {symbol:?} at position {position} in {path}")]
    NonAscii {
        path: String,
        symbol: char,
        position: usize,
    },
    #[error("Malformed record in {path}: {message}")]
    Malformed { path: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Fastq,
    Fasta,
    Lines,
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("bgz"))
        .unwrap_or(false)
}

/// Guess the record format from the file extension, looking through `.gz`.
pub fn infer_format(path: &Path) -> SequenceFormat {
    let mut ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    if ext == "gz" || ext == "bgz" {
        if let Some(stem) = path.file_stem() {
            ext = Path::new(stem)
                .extension()
                .and_then(|e| e.to_str())
                .map(|s| s.to_ascii_lowercase())
                .unwrap_or_default();
        }
    }

    match ext.as_str() {
        "fastq" | "fq" => SequenceFormat::Fastq,
        "fasta" | "fa" | "fna" => SequenceFormat::Fasta,
        _ => SequenceFormat::Lines,
    }
}

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, ReadSourceError> {
    if !path.exists() {
        return Err(ReadSourceError::NotFound(path.display().to_string()));
    }
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn uppercase_sequence(bytes: &[u8]) -> Result<String, ReadSourceError> {
    String::from_utf8(bytes.to_ascii_uppercase()).map_err(|_| ReadSourceError::NonUtf8)
}

fn malformed(path: &Path, error: impl std::fmt::Display) -> ReadSourceError {
    ReadSourceError::Malformed {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

/// Read every sequence record in `path`, upper-cased.
pub fn read_sequences(path: &Path) -> Result<Vec<String>, ReadSourceError> {
    let reader = open_reader(path)?;

    match infer_format(path) {
        SequenceFormat::Fastq => fastq::Reader::new(reader)
            .records()
            .map(|record| {
                let record = record.map_err(|e| malformed(path, e))?;
                uppercase_sequence(record.seq())
            })
            .collect(),
        SequenceFormat::Fasta => fasta::Reader::new(reader)
            .records()
            .map(|record| {
                let record = record.map_err(|e| malformed(path, e))?;
                uppercase_sequence(record.seq())
            })
            .collect(),
        SequenceFormat::Lines => {
            let mut sequences = Vec::new();
            for line in reader.lines() {
                let line = line?;
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                sequences.push(trimmed.to_ascii_uppercase());
            }
            Ok(sequences)
        }
    }
}

/// Load a reference as one contiguous sequence.
///
/// Multi-record files are concatenated in order; line breaks never survive.
/// The result is ASCII, so byte offsets into it are always char boundaries.
pub fn load_reference(path: &Path) -> Result<String, ReadSourceError> {
    let combined: String = read_sequences(path)?.concat();
    if combined.is_empty() {
        return Err(ReadSourceError::Empty(path.display().to_string()));
    }
    if let Some((position, symbol)) = combined.char_indices().find(|(_, c)| !c.is_ascii()) {
        return Err(ReadSourceError::NonAscii {
            path: path.display().to_string(),
            symbol,
            position,
        });
    }
    Ok(combined)
}
