use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by constructions.
///
/// Configuration problems are reported at construction time (or, for flag
/// basis preconditions, at call time) and leave no usable object behind.
/// A construction that simply does not implement a capability returns
/// `Ok(None)` instead of an error, and degenerate results (empty density
/// lists, rank-0 matrices) are ordinary values.
#[derive(Debug, Error)]
pub enum Error {
    #[error("degenerate oriented base structures are not supported")]
    DegenerateOrientedBase,

    #[error("base structure has {expected} vertices but {got} weights were given")]
    WeightCountMismatch { expected: usize, got: usize },

    #[error("unknown ad hoc construction `{0}`")]
    UnknownConstruction(String),

    #[error("flag basis is empty")]
    EmptyFlagBasis,

    #[error("flag basis mixes sizes {0} and {1}")]
    MixedFlagSizes(usize, usize),

    #[error("type has {type_size} vertices, larger than the flag size {flag_size}")]
    TypeLargerThanFlags { type_size: usize, flag_size: usize },

    #[error("invalid field specification: {0}")]
    InvalidFieldSpec(String),

    #[error("orbit oracle failed: {0}")]
    Oracle(#[from] OracleError),
}

/// Failures of the external group-orbit oracle.
///
/// These are fatal and propagated unchanged: exact combinatorial queries
/// have no meaningful partial results and are not retried.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("permutation {0:?} is not a bijection of 1..={1}")]
    MalformedPermutation(Vec<usize>, usize),

    #[error("generator application left the orbit domain (element {0:?})")]
    OutsideDomain(Vec<usize>),

    #[error("group closure exceeded {limit} elements")]
    GroupTooLarge { limit: usize },

    #[error("structure with {0} vertices is too large for the naive oracle")]
    StructureTooLarge(usize),
}
