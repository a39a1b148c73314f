use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Bag collection is empty")]
    EmptyCollection,

    #[error("Degenerate weights: {0}")]
    DegenerateWeights(String),

    #[error("Invalid weight for {key}: {value}")]
    InvalidWeight { key: String, value: f64 },

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Unknown bag: {0}")]
    UnknownBag(String),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Vectorization has zero mass")]
    ZeroVectorization,

    #[error("Invalid interval: [{lo}, {hi}]")]
    InvalidInterval { lo: f64, hi: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
