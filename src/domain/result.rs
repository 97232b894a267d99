//! Result type alias for the export job

use super::errors::ExportError;

/// Result type alias using [`ExportError`] as the error type
///
/// # Examples
///
/// ```
/// use slack_export::domain::result::Result;
/// use slack_export::domain::errors::ExportError;
///
/// fn failing_function() -> Result<()> {
///     Err(ExportError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ExportError>;
