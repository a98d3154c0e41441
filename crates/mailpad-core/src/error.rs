/// Application error records and an in-memory error log.
///
/// Library functions return `anyhow::Result`; the session layer turns the
/// failures it wants to surface to the user into [`AppError`]s and keeps them
/// in an [`ErrorLog`].
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Broad class of an application error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Validation,
    Storage,
    Network,
    File,
    Permission,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Storage => "STORAGE_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::File => "FILE_ERROR",
            Self::Permission => "PERMISSION_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// User-facing message used when the caller has none of its own.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid input",
            Self::Storage => "Storage is full or unavailable",
            Self::Network => "Network connection unavailable",
            Self::File => "File operation failed",
            Self::Permission => "Permission denied",
            Self::Unknown => "Unknown error, please retry",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error recorded for display to the user.
#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message).with_details(format!("field: {field}"))
    }

    pub fn storage(err: &anyhow::Error, operation: &str) -> Self {
        Self::new(ErrorCode::Storage, ErrorCode::Storage.default_message())
            .with_details(format!("{operation}: {err:#}"))
    }

    pub fn file(err: &anyhow::Error, file_name: Option<&str>) -> Self {
        let error = Self::new(ErrorCode::File, format!("{err:#}"));
        match file_name {
            Some(name) => error.with_details(format!("file: {name}")),
            None => error,
        }
    }

    pub fn network(err: &anyhow::Error, url: Option<&str>) -> Self {
        let details = match url {
            Some(url) => format!("{err:#} ({url})"),
            None => format!("{err:#}"),
        };
        Self::new(ErrorCode::Network, ErrorCode::Network.default_message()).with_details(details)
    }

    pub fn permission(action: &str) -> Self {
        Self::new(ErrorCode::Permission, ErrorCode::Permission.default_message())
            .with_details(format!("action: {action}"))
    }

    /// Wraps an arbitrary failure as `Unknown`.
    pub fn unknown(err: &anyhow::Error, context: Option<&str>) -> Self {
        let error = Self::new(ErrorCode::Unknown, format!("{err:#}"));
        match context {
            Some(ctx) => error.with_details(ctx.to_string()),
            None => error,
        }
    }
}

/// Errors collected during a session, oldest first.
#[derive(Debug, Default)]
pub struct ErrorLog {
    errors: Vec<AppError>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error and logs it.
    pub fn record(&mut self, error: AppError) -> &AppError {
        match &error.details {
            Some(details) => tracing::error!("{error} ({details})"),
            None => tracing::error!("{error}"),
        }
        self.errors.push(error);
        &self.errors[self.errors.len() - 1]
    }

    pub fn latest(&self) -> Option<&AppError> {
        self.errors.last()
    }

    pub fn has(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    pub fn errors(&self) -> &[AppError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Removes the oldest error with `code`. Returns whether one was removed.
    pub fn clear_code(&mut self, code: ErrorCode) -> bool {
        match self.errors.iter().position(|e| e.code == code) {
            Some(index) => {
                self.errors.remove(index);
                true
            }
            None => false,
        }
    }

    /// Runs `op` up to `max_attempts` times, sleeping `delay * attempt`
    /// between failures. The final failure is recorded and `None` returned.
    pub fn with_retry<T>(
        &mut self,
        max_attempts: u32,
        delay: Duration,
        mut op: impl FnMut() -> anyhow::Result<T>,
    ) -> Option<T> {
        let attempts = max_attempts.max(1);
        for attempt in 1..=attempts {
            match op() {
                Ok(value) => return Some(value),
                Err(e) if attempt == attempts => {
                    let context = format!("Failed after {attempts} attempt(s)");
                    self.record(AppError::unknown(&e, Some(&context)));
                }
                Err(e) => {
                    tracing::debug!("Attempt {attempt}/{attempts} failed: {e:#}");
                    std::thread::sleep(delay * attempt);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_error_display_includes_code() {
        let err = AppError::new(ErrorCode::File, "disk gone");
        assert_eq!(err.to_string(), "[FILE_ERROR] disk gone");
    }

    #[test]
    fn test_constructors_fill_details() {
        let err = AppError::validation("title", "Title is required");
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.details.as_deref(), Some("field: title"));

        let err = AppError::storage(&anyhow!("quota"), "save draft");
        assert_eq!(err.message, "Storage is full or unavailable");
        assert_eq!(err.details.as_deref(), Some("save draft: quota"));

        let err = AppError::permission("clipboard read");
        assert_eq!(err.code, ErrorCode::Permission);
    }

    #[test]
    fn test_log_latest_has_and_clear_code() {
        let mut log = ErrorLog::new();
        assert!(log.latest().is_none());

        log.record(AppError::new(ErrorCode::Storage, "a"));
        log.record(AppError::new(ErrorCode::File, "b"));
        log.record(AppError::new(ErrorCode::Storage, "c"));

        assert_eq!(log.latest().map(|e| e.message.as_str()), Some("c"));
        assert!(log.has(ErrorCode::File));
        assert!(!log.has(ErrorCode::Network));

        assert!(log.clear_code(ErrorCode::Storage));
        assert_eq!(log.errors()[0].message, "b");
        assert_eq!(log.len(), 2);
        assert!(!log.clear_code(ErrorCode::Network));

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_with_retry_succeeds_after_failures() {
        let mut log = ErrorLog::new();
        let mut calls = 0;
        let result = log.with_retry(3, Duration::ZERO, || {
            calls += 1;
            if calls < 3 {
                Err(anyhow!("flaky"))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result, Some(3));
        assert!(log.is_empty());
    }

    #[test]
    fn test_with_retry_records_final_failure() {
        let mut log = ErrorLog::new();
        let mut calls = 0;
        let result: Option<()> = log.with_retry(2, Duration::ZERO, || {
            calls += 1;
            Err(anyhow!("always"))
        });
        assert!(result.is_none());
        assert_eq!(calls, 2);
        assert_eq!(log.latest().map(|e| e.code), Some(ErrorCode::Unknown));
    }
}
