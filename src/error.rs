/// Broad failure categories surfaced by the core.
///
/// Every error carries a kind so callers can react programmatically (e.g.,
/// reject a single sample reading without aborting the run) and so the binary
/// can map failures to stable process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed inputs (bad series arguments, mismatched lengths, bad files).
    InvalidArgument,
    /// Filesystem or serialization failures.
    Io,
    /// The optimizer could not fit the model to the data.
    Convergence,
    /// An evaluation was requested outside the mathematically valid domain.
    Domain,
    /// A statistic is undefined for this dataset (e.g., zero variance).
    DegenerateData,
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn convergence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Convergence, message)
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Domain, message)
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DegenerateData, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind {
            ErrorKind::InvalidArgument | ErrorKind::Io => 2,
            ErrorKind::DegenerateData => 3,
            ErrorKind::Convergence => 4,
            ErrorKind::Domain => 5,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable_per_kind() {
        assert_eq!(AppError::invalid_argument("x").exit_code(), 2);
        assert_eq!(AppError::io("x").exit_code(), 2);
        assert_eq!(AppError::degenerate("x").exit_code(), 3);
        assert_eq!(AppError::convergence("x").exit_code(), 4);
        assert_eq!(AppError::domain("x").exit_code(), 5);
    }
}
