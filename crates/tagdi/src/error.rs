//! Error types for definition and resolution failures

use std::path::PathBuf;

use crate::definition::Kind;

/// Coarse classification of a [`DIError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised while defining services: bad keys, bad tags, bad aliases, bad config
    Configuration,
    /// The registry was already sealed when a mutation was attempted
    Misuse,
    /// A private service was requested through the public surface
    Visibility,
    /// A service re-entered its own dependency chain
    Cycle,
    /// Nothing is registered under the requested key
    Lookup,
    /// The factory ran but failed or produced an unexpected type
    Construction,
}

/// Errors that can occur during dependency injection operations
#[derive(Debug, thiserror::Error)]
pub enum DIError {
    #[error("invalid service key '{raw}': the bare key must not be empty")]
    InvalidKey { raw: String },

    #[error("{tag} tag value '{value}' is not a valid {expected} (definition '{key}')")]
    InvalidTagValue {
        key: String,
        tag: String,
        value: String,
        expected: &'static str,
    },

    #[error("tag '{tag}' can't be used simultaneously with [factory value alias inject] (definition '{key}')")]
    ConflictingKinds { key: String, tag: String },

    #[error("definition '{key}' is tagged as {declared} but bound to a {bound} target")]
    KindMismatch {
        key: String,
        declared: Kind,
        bound: Kind,
    },

    #[error("definition with id '{target}' does not exist and alias '{key}' cannot be set")]
    AliasTargetNotFound { key: String, target: String },

    #[error("definition with id '{target}' is an alias itself and alias '{key}' cannot be set")]
    AliasTargetIsAlias { key: String, target: String },

    #[error("definition with id '{key}' already exists and alias cannot be set")]
    AliasOverridesDefinition { key: String },

    #[error("invalid parameter '{key}': {message}")]
    InvalidParameter { key: String, message: String },

    #[error("invalid container configuration: {message}")]
    ConfigParse { message: String },

    #[error("failed to read container configuration {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("container is resolved and new items can not be set")]
    RegistrySealed,

    #[error("service with key '{key}' not found")]
    NotFound { key: String },

    #[error("parameter with key '{key}' not found")]
    ParameterNotFound { key: String },

    #[error("service with key '{key}' is private and can't be retrieved from the container")]
    PrivateService { key: String },

    #[error("circular reference found while building service '{origin}' at service '{at}'")]
    CircularReference { origin: String, at: String },

    #[error("service '{key}' is not of type {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("parameter '{key}' is not of type {expected}: {message}")]
    ParameterTypeMismatch {
        key: String,
        expected: &'static str,
        message: String,
    },

    #[error("factory for service '{key}' failed: {source}")]
    Factory {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type DIResult<T> = Result<T, DIError>;

impl DIError {
    /// Wrap an arbitrary failure raised inside the factory of `key`
    pub fn factory<E: Into<anyhow::Error>>(key: impl Into<String>, error: E) -> Self {
        Self::Factory {
            key: key.into(),
            source: error.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKey { .. }
            | Self::InvalidTagValue { .. }
            | Self::ConflictingKinds { .. }
            | Self::KindMismatch { .. }
            | Self::AliasTargetNotFound { .. }
            | Self::AliasTargetIsAlias { .. }
            | Self::AliasOverridesDefinition { .. }
            | Self::InvalidParameter { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigIo { .. } => ErrorKind::Configuration,
            Self::RegistrySealed => ErrorKind::Misuse,
            Self::PrivateService { .. } => ErrorKind::Visibility,
            Self::CircularReference { .. } => ErrorKind::Cycle,
            Self::NotFound { .. } | Self::ParameterNotFound { .. } => ErrorKind::Lookup,
            Self::TypeMismatch { .. }
            | Self::ParameterTypeMismatch { .. }
            | Self::Factory { .. } => ErrorKind::Construction,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
