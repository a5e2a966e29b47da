use std::fmt;

/// Errors returned by curve operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The solver was handed a path with no knots.
    EmptyPath,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "cannot solve an empty path"),
        }
    }
}

impl std::error::Error for Error {}
