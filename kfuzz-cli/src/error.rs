//! Application errors
use std::fmt;

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Kfuzz(err) => Some(err),
            ErrorKind::Io(err) => Some(err),
            ErrorKind::Config(err) => Some(err),
            ErrorKind::ShortWrite { .. } | ErrorKind::Target(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum ErrorKind {
    Kfuzz(kfuzz::KfuzzError),
    Io(std::io::Error),
    Config(serde_yaml::Error),
    /// Control file accepted only part of the blob.
    ShortWrite { written: usize, expected: usize },
    /// Fuzz target name that can't be used as a path component.
    Target(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "application error: {}", self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kfuzz(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::ShortWrite { written, expected } => {
                write!(f, "short write to control file: {written} of {expected} bytes")
            }
            Self::Target(name) => write!(f, "invalid fuzz target name {name:?}"),
        }
    }
}

impl From<ErrorKind> for AppError {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl From<kfuzz::KfuzzError> for AppError {
    fn from(err: kfuzz::KfuzzError) -> Self {
        Self {
            kind: ErrorKind::Kfuzz(err),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io(err),
        }
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        Self {
            kind: ErrorKind::Config(err),
        }
    }
}
