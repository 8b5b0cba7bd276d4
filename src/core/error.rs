//! Purpose: Single normalized error shape shared by the API client, controllers, and CLI.
//! Exports: `Error`, `ErrorKind`, `to_exit_code`.
//! Role: Every transport, decode, and validation failure funnels into `Error`.
//! Invariants: `detail()` always yields a display-ready string, never empty.
//! Invariants: Exit code mapping is stable once published.
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    Validation,
    NotFound,
    Api,
    Network,
    Decode,
    Io,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    status: Option<u16>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            status: None,
            source: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation).with_message(message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Human-readable text suitable for showing inline next to a form.
    pub fn detail(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match self.kind {
            ErrorKind::Internal => "internal error".to_string(),
            ErrorKind::Usage => "usage error".to_string(),
            ErrorKind::Validation => "invalid input".to_string(),
            ErrorKind::NotFound => "not found".to_string(),
            ErrorKind::Api => "request failed".to_string(),
            ErrorKind::Network => "network error".to_string(),
            ErrorKind::Decode => "unexpected response".to_string(),
            ErrorKind::Io => "i/o error".to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Validation => 4,
        ErrorKind::Api => 5,
        ErrorKind::Network => 6,
        ErrorKind::Decode => 7,
        ErrorKind::Io => 8,
    }
}
