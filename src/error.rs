//! Error types for pipeline construction and document compilation.
//!
//! Malformed custom syntax is never an error: every pass degrades to literal
//! text instead. The only failures are configuration problems, and those are
//! reported with the pass (and, at compile time, the document) they belong to.

use thiserror::Error;

/// Errors raised while building a pipeline or compiling a document.
#[derive(Error, Debug)]
pub enum Error {
    /// A pass was configured with an invalid option.
    #[error("invalid configuration for pass `{pass}`: {message}")]
    Config { pass: &'static str, message: String },

    /// A failure while compiling a named document.
    #[error("failed to compile `{document}`: {source}")]
    Document {
        document: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid JSON options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML options: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML options: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn config(pass: &'static str, message: impl Into<String>) -> Self {
        Error::Config {
            pass,
            message: message.into(),
        }
    }

    pub(crate) fn in_document(self, document: &str) -> Self {
        match self {
            Error::Document { .. } => self,
            other => Error::Document {
                document: document.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Name of the pass that failed, if the error can be traced to one.
    pub fn pass(&self) -> Option<&'static str> {
        match self {
            Error::Config { pass, .. } => Some(pass),
            Error::Document { source, .. } => source.pass(),
            Error::Json(_) | Error::Yaml(_) | Error::Toml(_) => None,
        }
    }

    /// Name of the document being compiled when the error occurred.
    pub fn document(&self) -> Option<&str> {
        match self {
            Error::Document { document, .. } => Some(document),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
