/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// tests and HTTP status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    NotFound,
    AlreadyExists,
    PayloadTooLarge,

    // Concurrency
    Concurrency,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::PayloadTooLarge => "ERR_PAYLOAD_TOO_LARGE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification (`kind`) for programmatic handling plus optional
/// context for debugging: the operation, the entity (workbook key or row
/// id), the request it happened in, and a wrapped cause.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
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
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (workbook key, row id, ...)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
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

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Shorthand for `NotFound` on a given entity
    pub fn not_found(op: &str, entity_id: impl Into<String>) -> Self {
        Self::new(ExErrorKind::NotFound)
            .with_op(op)
            .with_entity_id(entity_id)
            .with_message("not found")
    }

    /// Shorthand for `InvalidInput` with a message
    pub fn invalid_input(op: &str, message: impl Into<String>) -> Self {
        Self::new(ExErrorKind::InvalidInput)
            .with_op(op)
            .with_message(message)
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

impl From<&ExError> for ExError {
    fn from(err: &ExError) -> Self {
        err.clone()
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_context() {
        let err = ExError::new(ExErrorKind::Persistence)
            .with_op("snapshot_put")
            .with_entity_id("sheet-a")
            .with_message("disk full");

        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert_eq!(err.code(), "ERR_PERSISTENCE");
        assert_eq!(err.op(), Some("snapshot_put"));
        assert_eq!(err.entity_id(), Some("sheet-a"));
        assert_eq!(err.message(), "disk full");
    }

    #[test]
    fn test_display_format() {
        let err = ExError::not_found("llm_config_get", "7");
        assert_eq!(
            err.to_string(),
            "[ERR_NOT_FOUND] in operation 'llm_config_get': not found (entity_id: 7)"
        );
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;

        let inner = ExError::new(ExErrorKind::Io).with_message("permission denied");
        let outer = ExError::new(ExErrorKind::Persistence).with_source(inner);

        assert_eq!(outer.source_error().unwrap().kind(), ExErrorKind::Io);
        assert!(outer.source().is_some());
    }

    #[test]
    fn test_codes_are_unique() {
        let kinds = [
            ExErrorKind::InvalidInput,
            ExErrorKind::NotFound,
            ExErrorKind::AlreadyExists,
            ExErrorKind::PayloadTooLarge,
            ExErrorKind::Concurrency,
            ExErrorKind::Io,
            ExErrorKind::Serialization,
            ExErrorKind::Persistence,
            ExErrorKind::Config,
            ExErrorKind::Internal,
        ];
        let mut codes: Vec<_> = kinds.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }
}
