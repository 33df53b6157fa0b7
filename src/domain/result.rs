//! Result type alias for Cardiomask
//!
//! This module provides a convenient Result type alias that uses
//! CardiomaskError as the error type.

use super::errors::CardiomaskError;

/// Result type alias for Cardiomask operations
///
/// This is a convenience type alias that uses `CardiomaskError` as the error
/// type. Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use cardiomask::domain::result::Result;
/// use cardiomask::domain::errors::CardiomaskError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CardiomaskError::Format("missing underscore".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CardiomaskError>;
