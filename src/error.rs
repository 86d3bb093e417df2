//! Error types for trimly operations.
//!
//! The engine has exactly three failure modes: a caller handed in views whose
//! dimensions or strides do not match the requested operation, the scratch
//! size arithmetic cannot form a valid allocation layout, or the heap scratch
//! allocation itself failed. All of them surface immediately as `Err`; the
//! engine never substitutes a degraded path and never writes a partial result.

use std::fmt;

/// Errors that can occur during trimly operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrimlyError {
    /// Heap scratch allocation failed.
    AllocationError {
        /// The size that was requested to be allocated, in bytes.
        requested_size: usize,
        /// The alignment that was requested.
        requested_alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Scratch size/alignment arithmetic cannot form a valid layout.
    LayoutError {
        /// The size parameter that caused the error, in bytes.
        size: usize,
        /// The alignment parameter that caused the error.
        alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// A matrix view does not cover the requested operation.
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
}

impl fmt::Display for TrimlyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimlyError::AllocationError {
                requested_size,
                requested_alignment,
                message,
            } => write!(
                f,
                "Scratch allocation failed: {} (requested {} bytes with {} byte alignment)",
                message, requested_size, requested_alignment
            ),
            TrimlyError::LayoutError {
                size,
                alignment,
                message,
            } => write!(
                f,
                "Invalid scratch layout: {} (size: {}, alignment: {})",
                message, size, alignment
            ),
            TrimlyError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
        }
    }
}

impl std::error::Error for TrimlyError {}

/// Result type alias for trimly operations.
pub type Result<T> = std::result::Result<T, TrimlyError>;

/// Creates an allocation error.
pub fn allocation_error(size: usize, alignment: usize, message: impl Into<String>) -> TrimlyError {
    TrimlyError::AllocationError {
        requested_size: size,
        requested_alignment: alignment,
        message: message.into(),
    }
}

/// Creates a layout error.
pub fn layout_error(size: usize, alignment: usize, message: impl Into<String>) -> TrimlyError {
    TrimlyError::LayoutError {
        size,
        alignment,
        message: message.into(),
    }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> TrimlyError {
    TrimlyError::ValidationError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_error_display() {
        let error = allocation_error(4096, 64, "out of memory");
        let display = format!("{}", error);
        assert!(display.contains("Scratch allocation failed"));
        assert!(display.contains("4096 bytes"));
        assert!(display.contains("64 byte alignment"));
        assert!(display.contains("out of memory"));
    }

    #[test]
    fn test_layout_error_display() {
        let error = layout_error(usize::MAX, 64, "scratch size overflows");
        let display = format!("{}", error);
        assert!(display.contains("Invalid scratch layout"));
        assert!(display.contains("alignment: 64"));
        assert!(display.contains("scratch size overflows"));
    }

    #[test]
    fn test_validation_error_display() {
        let error = validation_error("operand A is 3x3 but the call needs order 4");
        let display = format!("{}", error);
        assert!(display.contains("Validation error"));
        assert!(display.contains("order 4"));
    }

    #[test]
    fn test_error_equality() {
        let error1 = allocation_error(1024, 64, "test");
        let error2 = allocation_error(1024, 64, "test");
        let error3 = allocation_error(2048, 64, "test");

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = validation_error("test error");

        let as_dyn: &dyn std::error::Error = &error;
        assert!(as_dyn.source().is_none());
    }
}
