#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the metrics tracker crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Missing API data is never an error in this crate: fetch failures collapse
//! into empty records at the collector. The variants below cover the failures
//! that do surface: configuration problems, identity lookup, unexpected wire
//! shapes and report output.

use std::path::{Path, PathBuf};

/// Unified error type returned by the tracker library and CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading configuration files.
    #[error("failed to read configuration from {path:?}: {source}")]
    Io {
        /// Location of the configuration file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when the configuration or CLI input violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps serialization errors when writing the JSON report.
    #[error("failed to serialize metrics: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Wraps I/O errors that occur while writing report files.
    #[error("failed to write report at {path:?}: {source}")]
    Output {
        /// Location of the report being produced.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Wraps CSV writer errors.
    #[error("failed to write CSV report at {path:?}: {source}")]
    Csv {
        /// Location of the CSV report.
        path:   PathBuf,
        /// Underlying CSV error.
        source: csv::Error
    },
    /// Service errors when interacting with the GitHub API.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    },
    /// A payload was received but did not match the expected wire shape.
    #[error("unexpected payload for {resource}: {source}")]
    Decode {
        /// Resource whose payload failed to decode, e.g. `releases`.
        resource: String,
        /// Underlying decoding error.
        source:   serde_json::Error
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the service error.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Constructs a decode error for the named resource.
    pub fn decode<R>(resource: R, source: serde_json::Error) -> Self
    where
        R: Into<String>
    {
        Self::Decode {
            resource: resource.into(),
            source
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<masterror::AppError> for Error {
    fn from(error: masterror::AppError) -> Self {
        Self::Service {
            message: error.to_string()
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the configuration file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::Output`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the report file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn output_error(path: &Path, source: std::io::Error) -> Error {
    Error::Output {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::Csv`] variant capturing the failing path and source.
pub fn csv_error(path: &Path, source: csv::Error) -> Error {
    Error::Csv {
        path: path.to_path_buf(),
        source
    }
}
