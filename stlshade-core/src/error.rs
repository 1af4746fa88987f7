/// Errors raised while loading mesh files
use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum StlError {
    /// The file could not be opened for reading
    Open { path: PathBuf, source: io::Error },
    /// Reading from an already opened source failed
    Io(io::Error),
    /// Fewer bytes than the header and declared triangle count require
    Truncated { expected: usize, actual: usize },
    /// Malformed ASCII STL
    Ascii(String),
}

impl From<io::Error> for StlError {
    fn from(err: io::Error) -> Self {
        StlError::Io(err)
    }
}

impl fmt::Display for StlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StlError::Open { path, source } => {
                write!(f, "cannot open {}: {}", path.display(), source)
            }
            StlError::Io(err) => write!(f, "io error: {}", err),
            StlError::Truncated { expected, actual } => write!(
                f,
                "truncated STL: expected at least {} bytes, got {}",
                expected, actual
            ),
            StlError::Ascii(msg) => write!(f, "invalid ASCII STL: {}", msg),
        }
    }
}

impl std::error::Error for StlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StlError::Open { source, .. } => Some(source),
            StlError::Io(err) => Some(err),
            _ => None,
        }
    }
}
