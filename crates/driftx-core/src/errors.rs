use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// tests and process exit reporting. The first group covers per-entry
/// failures, which a run reports as warnings instead of aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Per-entry (non-fatal inside a run)
    /// Snapshot file is unreadable, not valid JSON, or not a JSON object
    Parse,
    /// Snapshot has no resolvable `(category, objectId)` identity
    Identity,
    /// Structural comparison met a value it cannot represent
    Diff,
    /// Two snapshots in one generation share an identity
    DuplicateIdentity,

    // Run-level
    InvalidPattern,
    InvalidConfig,
    /// Previous and current generations were exported for different category sets
    IncompatibleGenerations,
    NotFound,

    // Integration/IO
    Io,
    Serialization,
    /// The change log could not be persisted
    Write,
    /// A snapshot provider collaborator (e.g. git) failed
    ExternalService,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Parse => "ERR_PARSE",
            ExErrorKind::Identity => "ERR_IDENTITY",
            ExErrorKind::Diff => "ERR_DIFF",
            ExErrorKind::DuplicateIdentity => "ERR_DUPLICATE_IDENTITY",
            ExErrorKind::InvalidPattern => "ERR_INVALID_PATTERN",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::IncompatibleGenerations => "ERR_INCOMPATIBLE_GENERATIONS",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Write => "ERR_WRITE",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
        }
    }

    /// Whether a run may continue after an error of this kind
    pub fn is_per_entry(&self) -> bool {
        matches!(
            self,
            ExErrorKind::Parse
                | ExErrorKind::Identity
                | ExErrorKind::Diff
                | ExErrorKind::DuplicateIdentity
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling and context for
/// debugging: the operation that failed, the entity (object identity or
/// file path) involved, and an optional causing error.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    path: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            path: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add file path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the file path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain failures raised while loading and comparing snapshots
///
/// Every variant is scoped to a single snapshot or pattern, which is what
/// lets a run downgrade them to warnings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriftError {
    // ===== Parse Errors =====
    /// Snapshot bytes are not valid JSON
    #[error("snapshot {path} is not valid JSON: {reason}")]
    InvalidJson { path: String, reason: String },

    /// Snapshot root is valid JSON but not an object
    #[error("snapshot {path} must contain a JSON object at its root")]
    NotAnObject { path: String },

    /// Snapshot could not be read by its provider
    #[error("snapshot {path} could not be read: {reason}")]
    Unreadable { path: String, reason: String },

    // ===== Identity Errors =====
    /// Snapshot lies directly under the generation root
    #[error("snapshot {path} is not inside a category directory")]
    MissingCategory { path: String },

    /// Snapshot body has no usable `id` field
    #[error("snapshot {path} has no usable `id` field")]
    MissingId { path: String },

    /// Identity already claimed by another snapshot in the same generation
    #[error("snapshot {path} duplicates identity {identity} already provided by {kept}")]
    DuplicateIdentity {
        path: String,
        identity: String,
        kept: String,
    },

    // ===== Diff Errors =====
    /// NaN or infinite number found while comparing
    #[error("value at {path} is not a representable number: {value}")]
    UnrepresentableNumber { path: String, value: String },

    // ===== Pattern Errors =====
    /// Exclusion pattern could not be parsed
    #[error("invalid path pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl DriftError {
    /// Classify this failure into the canonical taxonomy
    pub fn kind(&self) -> ExErrorKind {
        match self {
            DriftError::InvalidJson { .. }
            | DriftError::NotAnObject { .. }
            | DriftError::Unreadable { .. } => ExErrorKind::Parse,
            DriftError::MissingCategory { .. } | DriftError::MissingId { .. } => {
                ExErrorKind::Identity
            }
            DriftError::DuplicateIdentity { .. } => ExErrorKind::DuplicateIdentity,
            DriftError::UnrepresentableNumber { .. } => ExErrorKind::Diff,
            DriftError::InvalidPattern { .. } => ExErrorKind::InvalidPattern,
        }
    }

    /// The snapshot file (or pattern) this failure is about
    pub fn subject(&self) -> &str {
        match self {
            DriftError::InvalidJson { path, .. }
            | DriftError::NotAnObject { path }
            | DriftError::Unreadable { path, .. }
            | DriftError::MissingCategory { path }
            | DriftError::MissingId { path }
            | DriftError::DuplicateIdentity { path, .. }
            | DriftError::UnrepresentableNumber { path, .. } => path,
            DriftError::InvalidPattern { pattern, .. } => pattern,
        }
    }
}

impl From<DriftError> for ExError {
    fn from(err: DriftError) -> Self {
        let op = match err.kind() {
            ExErrorKind::Parse => "parse_snapshot",
            ExErrorKind::Identity | ExErrorKind::DuplicateIdentity => "resolve_identity",
            ExErrorKind::Diff => "diff",
            _ => "parse_pattern",
        };
        let mut ex = ExError::new(err.kind())
            .with_op(op)
            .with_message(err.to_string());
        ex = match &err {
            DriftError::DuplicateIdentity { path, identity, .. } => {
                ex.with_path(path.clone()).with_entity_id(identity.clone())
            }
            DriftError::InvalidPattern { .. } => ex,
            other => ex.with_path(other.subject().to_string()),
        };
        ex
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}
