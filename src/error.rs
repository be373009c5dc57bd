use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a run.
#[derive(Debug, Error)]
pub enum OrganiseError {
    #[error("This tool only works with FL Studio on Windows (running on {os})")]
    UnsupportedPlatform { os: &'static str },

    #[error("Could not find plugin database at {path:?}")]
    DatabaseNotFound { path: PathBuf },

    #[error("Could not create folder {path:?}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OrganiseError {
    /// Process exit code the CLI reports for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            OrganiseError::UnsupportedPlatform { .. } => 3,
            OrganiseError::DatabaseNotFound { .. } => 2,
            OrganiseError::Destination { .. } => 1,
        }
    }
}

/// Failure copying one descriptor/companion pair.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("Failed to copy {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Copy of {path:?} does not match the original")]
    DigestMismatch { path: PathBuf },
}

impl CopyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CopyError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_fatal_kinds() {
        let missing = OrganiseError::DatabaseNotFound {
            path: PathBuf::from("db"),
        };
        let platform = OrganiseError::UnsupportedPlatform { os: "linux" };
        let destination = OrganiseError::Destination {
            path: PathBuf::from("out"),
            source: std::io::Error::other("boom"),
        };

        assert_eq!(missing.exit_code(), 2);
        assert_eq!(platform.exit_code(), 3);
        assert_eq!(destination.exit_code(), 1);
        assert!(missing.to_string().contains("Could not find plugin database"));
    }
}
