//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the salary pipeline and its workflows can surface.

use thiserror::Error;

use crate::models::PayPeriod;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, so request handlers
/// can translate failures into responses in one place.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "salary",
///     id: "42".to_string(),
/// };
/// assert_eq!(error.to_string(), "salary not found: 42");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or is inconsistent.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity that was looked up (e.g. "employee").
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A mutation violates a status-machine precondition.
    #[error("Conflict: {message}")]
    Conflict {
        /// A description of the violated precondition.
        message: String,
    },

    /// An input value is outside its allowed bounds.
    #[error("Invalid value for '{field}': {message}")]
    ValidationError {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A salary already exists for the employee and period.
    #[error("Salary already exists for employee '{employee_id}' in {period}")]
    Duplicate {
        /// The employee the salary belongs to.
        employee_id: String,
        /// The period of the existing salary.
        period: PayPeriod,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::ValidationError`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/policy.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/policy.yaml"
        );
    }

    #[test]
    fn test_not_found_displays_entity_and_id() {
        let error = EngineError::not_found("employee", "emp_404");
        assert_eq!(error.to_string(), "employee not found: emp_404");
    }

    #[test]
    fn test_conflict_displays_message() {
        let error = EngineError::conflict("salary is not pending");
        assert_eq!(error.to_string(), "Conflict: salary is not pending");
    }

    #[test]
    fn test_validation_error_displays_field_and_message() {
        let error = EngineError::validation("amount", "must be greater than zero");
        assert_eq!(
            error.to_string(),
            "Invalid value for 'amount': must be greater than zero"
        );
    }

    #[test]
    fn test_duplicate_displays_employee_and_period() {
        let error = EngineError::Duplicate {
            employee_id: "emp_001".to_string(),
            period: PayPeriod::new(2, 2026).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Salary already exists for employee 'emp_001' in 02/2026"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_conflict() -> EngineResult<()> {
            Err(EngineError::conflict("locked"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_conflict()?;
            Ok(())
        }

        assert!(matches!(
            propagates_error(),
            Err(EngineError::Conflict { .. })
        ));
    }
}
