//! Result type alias for Folio
//!
//! This module provides a convenient Result type alias that uses FolioError
//! as the error type.

use super::errors::FolioError;

/// Result type alias for Folio operations
///
/// # Examples
///
/// ```
/// use folio::domain::result::Result;
/// use folio::domain::errors::FolioError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(FolioError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FolioError>;
