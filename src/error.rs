use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use rand_distr::{NormalError, uniform::Error as UniformError};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The crate's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum MlErr {
    /// An argument is invalid for semantic reasons (zero sizes, unset loss, ...).
    InvalidArgument(&'static str),
    /// A length invariant was violated.
    DimensionMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A random distribution could not be built from its parameters.
    Distribution(String),
    /// A configuration could not be decoded.
    Config(String),
}

impl MlErr {
    /// Fails with `DimensionMismatch` unless `got == expected`.
    pub(crate) fn check_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
        if got != expected {
            return Err(MlErr::DimensionMismatch {
                what,
                got,
                expected,
            });
        }

        Ok(())
    }
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            MlErr::DimensionMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "dimension mismatch for {what}: got {got}, expected {expected}"
            ),
            MlErr::Distribution(msg) => write!(f, "invalid distribution: {msg}"),
            MlErr::Config(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for MlErr {}

impl From<NormalError> for MlErr {
    fn from(value: NormalError) -> Self {
        Self::Distribution(value.to_string())
    }
}

impl From<UniformError> for MlErr {
    fn from(value: UniformError) -> Self {
        Self::Distribution(value.to_string())
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value.to_string())
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<MlErr> for io::Error {
    fn from(value: MlErr) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, value)
    }
}
