//! Per-file analysis entry points.
//!
//! Each file gets its own token stream, symbol table, and resolution
//! cache, so batches fan out over a thread pool with no coordination.

use rayon::prelude::*;

use crate::base::FileId;
use crate::lexer::{LexError, tokenize};
use crate::sniffs::{Diagnostic, Verifier};

/// Tokenize and verify one file's source text.
pub fn analyze_source(
    file: FileId,
    source: &str,
    verifier: &Verifier,
) -> Result<Vec<Diagnostic>, LexError> {
    let tokens = tokenize(file, source)?;
    Ok(verifier.check(&tokens))
}

/// Tokenize and verify a batch of files in parallel.
///
/// Results come back in input order. A file that fails to tokenize
/// reports its [`LexError`] without affecting the other files.
pub fn analyze_sources(
    sources: &[(FileId, &str)],
    verifier: &Verifier,
) -> Vec<(FileId, Result<Vec<Diagnostic>, LexError>)> {
    sources
        .par_iter()
        .map(|&(file, source)| (file, analyze_source(file, source, verifier)))
        .collect()
}
