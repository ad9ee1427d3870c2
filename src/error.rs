use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("{what} dimension ({found}) must equal {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Block size {block_size} too large for {dim} indicators")]
    BlockSizeTooLarge { block_size: usize, dim: usize },
    #[error("Block size must be at least one")]
    EmptyBlock,
    #[error("Operator weight must be positive and finite, got {0}")]
    InvalidWeight(f64),
    #[error("Numerical integrator needs at least one subdivision")]
    InvalidSubdivisions,
    #[error("Invalid distribution parameters: {0}")]
    InvalidDistribution(String),
    #[error("Indicator {index} of {name} is {value}, expected a non-negative value")]
    MalformedIndicators {
        name: String,
        index: usize,
        value: f64,
    },
    #[error("Entry {index} of {name} is {value}, expected a non-negative count")]
    CorruptValue {
        name: String,
        index: usize,
        value: f64,
    },
    #[error("Numerical integrator not specified")]
    MissingIntegrator,
    #[error("Cannot integrate over unbounded interval [{lower}, {upper}]")]
    UnboundedInterval { lower: f64, upper: f64 },
    #[error("{0} is not implemented")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, ModelError>;
