//! Error facility for locare
//!
//! A single structured error type with a stable kind/code taxonomy. The
//! kinds are the caller-facing contract: every precondition and invariant
//! violation surfaces as exactly one of them, synchronously, and none of
//! them is fatal to the process.

use locare_core_types::{RequestId, TraceId};

/// Result type alias using LocareError
pub type Result<T> = std::result::Result<T, LocareError>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code for programmatic handling, and to
/// the HTTP status an external REST binding should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced identifier does not resolve to an existing record
    NotFound,
    /// End date not after start date, or a non-positive monetary amount
    InvalidRange,
    /// Malformed input outside the range rules (empty name, blank field)
    InvalidInput,
    /// Invariant violation: leasing a Rented property, terminating a
    /// non-Active lease, or a failed status compare-and-set
    Conflict,
    /// The entity store failed to respond; never retried internally
    StoreUnavailable,
    /// A storage-layer failure other than unavailability
    Persistence,
    /// A record could not be encoded or decoded
    Serialization,
    /// A bug surfaced; should not happen in normal operation
    Internal,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "ERR_NOT_FOUND",
            ErrorKind::InvalidRange => "ERR_INVALID_RANGE",
            ErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ErrorKind::Conflict => "ERR_CONFLICT",
            ErrorKind::StoreUnavailable => "ERR_STORE_UNAVAILABLE",
            ErrorKind::Persistence => "ERR_PERSISTENCE",
            ErrorKind::Serialization => "ERR_SERIALIZATION",
            ErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// HTTP status code an external REST binding should map this kind to
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidRange | ErrorKind::InvalidInput => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::StoreUnavailable => 503,
            ErrorKind::Persistence | ErrorKind::Serialization | ErrorKind::Internal => 500,
        }
    }
}

/// Canonical structured error type
///
/// Carries the kind plus optional context (operation, entity id,
/// correlation ids) for debugging and structured logging.
#[derive(Debug, Clone)]
pub struct LocareError {
    kind: ErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<LocareError>>,
}

impl LocareError {
    /// Create a new error with the specified kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
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

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: LocareError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
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

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the trace ID context, if any
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&LocareError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for LocareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for LocareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

/// Build a NotFound error for a missing record
pub fn not_found(entity: &str, id: &str) -> LocareError {
    LocareError::new(ErrorKind::NotFound)
        .with_entity_id(id)
        .with_message(format!("{} not found", entity))
}

/// Build an InvalidRange error
pub fn invalid_range(reason: impl Into<String>) -> LocareError {
    LocareError::new(ErrorKind::InvalidRange).with_message(reason)
}

/// Build an InvalidInput error
pub fn invalid_input(reason: impl Into<String>) -> LocareError {
    LocareError::new(ErrorKind::InvalidInput).with_message(reason)
}

/// Build a Conflict error
pub fn conflict(reason: impl Into<String>) -> LocareError {
    LocareError::new(ErrorKind::Conflict).with_message(reason)
}
