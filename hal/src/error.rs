//! Common error types for HAL operations

use core::fmt;

/// HAL operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Timer period outside the range the reload register can encode
    InvalidPeriod,
    /// Interrupt line number beyond the controller's last line
    InvalidLine,
    /// Priority level wider than the implemented priority bits
    InvalidPriority,
    /// Exception number unknown, or exception not controllable this way
    InvalidExceptionKind,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPeriod => write!(f, "invalid timer period"),
            Self::InvalidLine => write!(f, "invalid interrupt line"),
            Self::InvalidPriority => write!(f, "invalid priority level"),
            Self::InvalidExceptionKind => write!(f, "invalid exception kind"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidPeriod => defmt::write!(fmt, "InvalidPeriod"),
            Self::InvalidLine => defmt::write!(fmt, "InvalidLine"),
            Self::InvalidPriority => defmt::write!(fmt, "InvalidPriority"),
            Self::InvalidExceptionKind => defmt::write!(fmt, "InvalidExceptionKind"),
        }
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;
