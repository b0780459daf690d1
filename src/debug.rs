//! Debug facilities and error types.
use nom::error::{VerboseError, VerboseErrorKind};
use std::{fmt, os::raw::c_int};

use crate::{graph::GraphError, parser::ParseError};

// Error types and From<...> implementations

/// Reasons to reject a call before nauty sees it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("{num_vertices} vertices need at least one setword per row")]
    ZeroSetwords { num_vertices: usize },
    #[error("{num_vertices} vertices don't fit into {num_setwords} setwords of {word_bits} bits")]
    TooFewSetwords {
        num_vertices: usize,
        num_setwords: usize,
        word_bits: usize,
    },
    #[error("{0} is out of range for nauty")]
    OutOfRange(usize),
    #[error("negative count {0}")]
    Negative(c_int),
    #[error("buffer `{name}` has length {actual}, expected {expected}")]
    BufferLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("null pointer given for `{0}`")]
    NullPointer(&'static str),
    #[error("labelling is not a permutation of the vertices")]
    NotAPermutation,
    #[error("the last cell of the partition is not terminated")]
    UnterminatedPartition,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(InvalidArgument),
    #[error("nauty reported error status {0}")]
    Engine(c_int),
    #[error("Graph error: {0}")]
    GraphError(GraphError),
    #[error("Error while parsing graph in dreadnaut syntax")]
    ParseError(Vec<VerboseErrorKind>),
}

impl From<InvalidArgument> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(ia: InvalidArgument) -> Self {
        Self::InvalidArgument(ia)
    }
}

impl From<GraphError> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(ge: GraphError) -> Self {
        Self::GraphError(ge)
    }
}

#[cfg(not(tarpaulin_include))]
fn handle_nom_verbose_error<E: fmt::Debug>(verbose: VerboseError<E>) -> Vec<VerboseErrorKind> {
    verbose
        .errors
        .into_iter()
        .map(|(input, kind)| {
            tracing::debug!(?input, ?kind, "dreadnaut parse failure");
            kind
        })
        .collect()
}

impl<'a> From<nom::Err<ParseError<'a>>> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(pe: nom::Err<ParseError<'a>>) -> Self {
        match pe {
            nom::Err::Error(verbose) | nom::Err::Failure(verbose) => {
                Self::ParseError(handle_nom_verbose_error(verbose))
            }
            // Only complete parsers are used.
            nom::Err::Incomplete(_) => Self::ParseError(Vec::new()),
        }
    }
}

// Custom formatter for debug printing

#[allow(clippy::ptr_arg)]
#[cfg(not(tarpaulin_include))]
pub fn bin_fmt<T: fmt::Binary>(vec: &Vec<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{")?;
    for number in vec {
        write!(f, "{:#066b}", number)?;
    }
    write!(f, "}}")?;

    Ok(())
}

// Debug macro that allows to time single expressions

#[macro_export]
macro_rules! time {
    ($i:ident, $ret:ident, $exp:expr) => {
        let before = std::time::Instant::now();
        let $ret = $exp;
        let $i = before.elapsed();
    };
}
