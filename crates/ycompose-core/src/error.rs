//! Error types for ycompose-core

use std::fmt;

/// Boxed lower-level error carried as the cause of an [`Error`].
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The category an [`Error`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A file could not be read or an include pattern matched nothing.
    Io,
    /// Malformed YAML/JSON, including a malformed variable substitution.
    Yaml,
    /// A directive block, patch or directive variable has the wrong shape
    /// or cannot be applied.
    Directive,
    /// A `${NAME}` reference with no value and no default.
    VarNotFound,
    /// The composed tree does not fit the requested type.
    Decode,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Io => "io error",
            ErrorKind::Yaml => "yaml error",
            ErrorKind::Directive => "directive error",
            ErrorKind::VarNotFound => "variable not found",
            ErrorKind::Decode => "decode error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A load failure.
///
/// Displays as `<category>: <message>`. Lower-level errors (parser, runtime,
/// another `Error`) are kept as the [`source`](std::error::Error::source) so
/// the whole chain can be rendered or inspected. The alternate form (`{:#}`)
/// appends every cause, each separated by `: `.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    cause: Option<Cause>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if f.alternate() {
            let mut cause = std::error::Error::source(self);
            while let Some(err) = cause {
                write!(f, ": {}", err)?;
                cause = std::error::Error::source(err);
            }
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn yaml(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Yaml, message)
    }

    pub fn directive(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Directive, message)
    }

    pub fn var_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VarNotFound, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    /// Attach the lower-level error that caused this one.
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this error, or any [`Error`] in its cause chain, belongs to
    /// `kind`.
    pub fn is(&self, kind: ErrorKind) -> bool {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
        while let Some(err) = current {
            if err.downcast_ref::<Error>().is_some_and(|e| e.kind == kind) {
                return true;
            }
            current = std::error::Error::source(err);
        }
        false
    }
}

/// Result type alias for ycompose-core operations.
pub type Result<T> = std::result::Result<T, Error>;
