use super::types::Error;
use std::fmt;

/// Where an error happened: component, operation and optional details
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub component: String,
    pub operation: String,
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new<S: Into<String>, T: Into<String>>(component: S, operation: T) -> Self {
        ErrorContext {
            component: component.into(),
            operation: operation.into(),
            details: None,
        }
    }

    /// Add details to the context
    pub fn with_details<S: Into<String>>(mut self, details: S) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in component '{}' during operation '{}'", self.component, self.operation)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

/// Extension trait for attaching an [`ErrorContext`] to errors and results
pub trait ErrorExt<T> {
    fn context(self, ctx: ErrorContext) -> std::result::Result<T, Error>;

    fn with_context<S: Into<String>, U: Into<String>>(
        self,
        component: S,
        operation: U,
    ) -> std::result::Result<T, Error>;
}

impl<T, E> ErrorExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, ctx: ErrorContext) -> std::result::Result<T, Error> {
        self.map_err(|err| match err.into() {
            Error::Config(msg) => Error::Config(format!("{} [{}]", msg, ctx)),
            Error::Logging(msg) => Error::Logging(format!("{} [{}]", msg, ctx)),
            Error::Internal(msg) => Error::Internal(format!("{} [{}]", msg, ctx)),
            Error::Io(io) => Error::Internal(format!("{} [{}]", io, ctx)),
        })
    }

    fn with_context<S: Into<String>, U: Into<String>>(
        self,
        component: S,
        operation: U,
    ) -> std::result::Result<T, Error> {
        self.context(ErrorContext::new(component, operation))
    }
}
