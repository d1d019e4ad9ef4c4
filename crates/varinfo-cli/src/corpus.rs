//! Corpus input: buffered line reading with transparent gzip decoding.
//!
//! The core consumes an already-decoded line stream; this module owns the
//! decision of how to produce one from a path. `.gz`-suffixed corpora are
//! decompressed on the fly.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

/// Opens a corpus file as a buffered line reader, decompressing `.gz` paths.
pub fn open_corpus(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

// =============================================================================
// Tests
// =============================================================================
