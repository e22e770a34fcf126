use bimdiff_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using BimDiffError
pub type Result<T> = std::result::Result<T, BimDiffError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (HTTP layers, CLIs,
/// tests) can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    /// A snapshot is missing, the version list is empty, or an element has no identity
    InvalidInput,
    /// Duplicate identity keys inside one snapshot (only fatal in strict mode)
    AmbiguousIdentity,
    /// Engine configuration failed to parse or validate
    InvalidConfig,

    // Execution
    /// A multi-version comparison was cancelled between cells
    Cancelled,
    Timeout,

    // Integration/IO
    Io,
    Serialization,
    /// A collaborator (snapshot provider, notifier) failed
    ExternalService,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::AmbiguousIdentity => "ERR_AMBIGUOUS_IDENTITY",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the context
/// needed to find the offending snapshot or element.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    version_id: Option<String>,
    element_key: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            version_id: None,
            element_key: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add snapshot version context
    pub fn with_version_id(mut self, id: impl Into<String>) -> Self {
        self.version_id = Some(id.into());
        self
    }

    /// Add element identity context (rendered identity key)
    pub fn with_element_key(mut self, key: impl Into<String>) -> Self {
        self.element_key = Some(key.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    pub fn element_key(&self) -> Option<&str> {
        self.element_key.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

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
        if let Some(version_id) = &self.version_id {
            write!(f, " (version_id: {})", version_id)?;
        }
        if let Some(element_key) = &self.element_key {
            write!(f, " (element: {})", element_key)?;
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

/// Domain error taxonomy for comparison operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BimDiffError {
    /// A required snapshot was not supplied or the provider has none for the version
    #[error("{role} snapshot missing: {version_id}")]
    MissingSnapshot { role: String, version_id: String },

    /// An element carries neither a globalId nor an expressId
    #[error("Element at position {position} in version {version_id} has neither globalId nor expressId")]
    ElementWithoutIdentity { version_id: String, position: usize },

    /// Two elements of one snapshot share an identity key (strict mode only)
    #[error("Duplicate identity {key} in version {version_id} at positions {first_position} and {duplicate_position}")]
    DuplicateIdentity {
        version_id: String,
        key: String,
        first_position: usize,
        duplicate_position: usize,
    },

    /// A multi-version comparison was requested with no snapshots
    #[error("At least one snapshot is required")]
    EmptyVersionList,

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Cooperative cancellation observed between matrix cells
    #[error("Comparison cancelled after {completed} of {total} cells")]
    Cancelled { completed: usize, total: usize },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<BimDiffError> for ExError {
    fn from(err: BimDiffError) -> Self {
        let message = err.to_string();
        match err {
            BimDiffError::MissingSnapshot { version_id, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_version_id(version_id)
                    .with_message(message)
            }
            BimDiffError::EmptyVersionList => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            BimDiffError::ElementWithoutIdentity { version_id, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_version_id(version_id)
                    .with_message(message)
            }
            BimDiffError::DuplicateIdentity {
                version_id, key, ..
            } => ExError::new(ExErrorKind::AmbiguousIdentity)
                .with_version_id(version_id)
                .with_element_key(key)
                .with_message(message),
            BimDiffError::InvalidConfig { .. } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }
            BimDiffError::Cancelled { .. } => {
                ExError::new(ExErrorKind::Cancelled).with_message(message)
            }
            BimDiffError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            BimDiffError::Io { .. } => ExError::new(ExErrorKind::Io).with_message(message),
            BimDiffError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for BimDiffError {
    fn from(err: serde_json::Error) -> Self {
        BimDiffError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for BimDiffError {
    fn from(err: std::io::Error) -> Self {
        BimDiffError::Io {
            message: err.to_string(),
        }
    }
}
