//! Interrupt controller abstraction

/// Interrupt controller abstraction
///
/// Takes raw line numbers and priority levels; implementations validate them
/// against their own line count and priority width.
pub trait InterruptController {
    /// Error returned for an out-of-range line or priority.
    type Error;

    /// Enable interrupt
    fn enable_interrupt(&self, irq_num: u32) -> Result<(), Self::Error>;

    /// Disable interrupt
    fn disable_interrupt(&self, irq_num: u32) -> Result<(), Self::Error>;

    /// Set interrupt priority
    fn set_priority(&self, irq_num: u32, priority: u8) -> Result<(), Self::Error>;

    /// Check if interrupt is enabled
    fn is_enabled(&self, irq_num: u32) -> Result<bool, Self::Error>;

    /// Check if interrupt is pending
    fn is_pending(&self, irq_num: u32) -> Result<bool, Self::Error>;

    /// Force interrupt into the pending state
    fn set_pending(&self, irq_num: u32) -> Result<(), Self::Error>;

    /// Clear pending interrupt
    fn clear_pending(&self, irq_num: u32) -> Result<(), Self::Error>;
}

/// Control over core processor exceptions.
pub trait ExceptionController {
    /// Error returned for an unknown or uncontrollable exception.
    type Error;

    /// Enable a configurable fault handler.
    fn enable_exception(&self, exception: u8) -> Result<(), Self::Error>;

    /// Disable a configurable fault handler.
    fn disable_exception(&self, exception: u8) -> Result<(), Self::Error>;

    /// Set the priority of a system exception.
    fn set_exception_priority(&self, exception: u8, priority: u8) -> Result<(), Self::Error>;
}
