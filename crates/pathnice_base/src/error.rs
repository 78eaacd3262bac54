use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

/// Error variants that can occur in pathnice operations.
/// Each variant represents a specific error category with its associated context.
#[derive(Debug)]
pub enum ErrorKind {
    /// Filesystem operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An existing filesystem entry's kind violates an operation's precondition
    Conflict { path: PathBuf, message: String },

    /// Two path values bound to different platform or filesystem implementations
    /// were combined
    Incompatible { message: String },

    /// Invalid call shape (e.g. a zero-segment entry-point call)
    InvalidArgument { message: String },

    /// Multiple errors occurred during batch operations
    Multiple {
        errors: Vec<PathNiceError>,
        count: usize,
    },

    /// Catch-all for other errors with a message
    Message { message: String },
}

/// Comprehensive error type wrapping ErrorKind with optional context.
/// Supports context attachment during propagation and cause chaining.
pub struct PathNiceError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<PathNiceError>>,
}

impl PathNiceError {
    /// Creates a new error from an ErrorKind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
        }
    }

    /// Creates a Message error from anything displayable.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Creates a FileError wrapping an I/O error for the given path.
    pub fn file_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(ErrorKind::FileError {
            path: path.into(),
            source,
        })
    }

    /// Creates a Conflict error for the given path.
    pub fn conflict(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict {
            path: path.into(),
            message: message.into(),
        })
    }

    /// Creates an Incompatible error.
    pub fn incompatible(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Incompatible {
            message: message.into(),
        })
    }

    /// Creates an InvalidArgument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument {
            message: message.into(),
        })
    }

    /// Attaches context to an error.
    /// Context is displayed before the error message.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    /// Useful to avoid expensive string construction for successful paths.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records another error as the cause of this one.
    pub fn caused_by(mut self, cause: PathNiceError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    /// Allows pattern matching on specific error variants.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the attached context strings, oldest first.
    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    /// Returns true if this error is a filesystem "not found" error.
    ///
    /// This is the predicate the filesystem helpers use to select their
    /// idempotent fallback behavior; every other filesystem error propagates.
    pub fn is_not_found(&self) -> bool {
        matches!(
            &self.kind,
            ErrorKind::FileError { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Returns the innermost error in the chain.
    /// Traverses the error source chain to find the root cause.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    fn kind_message(&self) -> String {
        match &self.kind {
            ErrorKind::FileError { path, source } => {
                format!("File error at {}: {}", path.display(), source)
            }
            ErrorKind::Conflict { path, message } => {
                format!("{}: {}", message, path.display())
            }
            ErrorKind::Incompatible { message } => message.clone(),
            ErrorKind::InvalidArgument { message } => message.clone(),
            ErrorKind::Multiple { errors, count } => match errors.first() {
                Some(first) => {
                    format!("Multiple errors occurred ({} total): {}", count, first)
                }
                None => format!("Multiple errors occurred ({} total)", count),
            },
            ErrorKind::Message { message } => message.clone(),
        }
    }

    fn render_tree(&self, out: &mut String, pad: &str) {
        out.push_str(pad);
        out.push_str(&self.kind_message());
        out.push('\n');
        let item_count = self.context.len() + usize::from(self.cause.is_some());
        for (i, ctx) in self.context.iter().enumerate() {
            let connector = if i + 1 == item_count { "└─" } else { "├─" };
            out.push_str(pad);
            out.push_str(connector);
            out.push(' ');
            out.push_str(ctx);
            out.push('\n');
        }
        if let Some(cause) = &self.cause {
            let mut nested = String::new();
            cause.render_tree(&mut nested, "");
            for (i, line) in nested.lines().enumerate() {
                out.push_str(pad);
                if i == 0 {
                    out.push_str("└─ cause: ");
                } else {
                    out.push_str("   ");
                }
                out.push_str(line);
                out.push('\n');
            }
        }
    }
}

impl From<ErrorKind> for PathNiceError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for PathNiceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        if let Some(cause) = &self.cause {
            return Some(cause.as_ref());
        }
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::Multiple { errors, .. } => errors.first().and_then(|e| e.source()),
            _ => None,
        }
    }
}

impl fmt::Display for PathNiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display context first if present
        for (i, ctx) in self.context.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", ctx)?;
            } else {
                write!(f, ": {}", ctx)?;
            }
        }

        if !self.context.is_empty() {
            write!(f, ": ")?;
        }

        write!(f, "{}", self.kind_message())
    }
}

impl fmt::Debug for PathNiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::new();
        self.render_tree(&mut rendered, "");
        f.write_str(rendered.trim_end_matches('\n'))
    }
}

/// Standard result type for pathnice operations.
///
/// Boxing the error keeps the Ok path small.
pub type PathNiceResult<T> = std::result::Result<T, Box<PathNiceError>>;

/// Extension trait for attaching context to Results.
/// Provides ergonomic error context attachment during error propagation.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    /// Eager evaluation: context is evaluated immediately.
    fn context(self, context: impl Into<String>) -> PathNiceResult<T>;

    /// Attaches context using lazy evaluation.
    /// Context is only evaluated if the result is an error.
    /// Prefer this to avoid expensive string formatting in the success path.
    fn with_context<F>(self, f: F) -> PathNiceResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for PathNiceResult<T> {
    fn context(self, context: impl Into<String>) -> PathNiceResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> PathNiceResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Constructs a boxed Message error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::error::PathNiceError::message(format!($($arg)*)))
    };
}
