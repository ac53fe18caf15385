//! Countdown timer abstraction

/// Procedure invoked from the timer interrupt.
///
/// Runs in interrupt context: it must not block and must not wait on the
/// timer's own busy-wait path.
pub type TimerCallback = fn();

/// How the timer was last configured to signal expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerMode {
    /// Raises an interrupt on every expiry.
    Periodic,
    /// Expiry is only observable by polling the count flag.
    BusyWait,
}

/// Lifecycle of a countdown timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    /// Never configured, or deinitialized.
    Uninitialized,
    /// Counting down.
    Running(TimerMode),
    /// Configured but halted; `start` resumes with the same period.
    Stopped(TimerMode),
}

/// Millisecond countdown timer.
///
/// All methods take `&self`: the timer is shared between thread code and
/// its own interrupt handler.
pub trait Timer {
    /// Error returned for an unencodable period.
    type Error;

    /// Configure periodic interrupts every `period_ms` and start counting.
    fn start_periodic(&self, period_ms: u32) -> Result<(), Self::Error>;

    /// Configure a `period_ms` countdown and block until it expires.
    fn start_busy_wait(&self, period_ms: u32) -> Result<(), Self::Error>;

    /// Resume counting with the current configuration.
    fn start(&self);

    /// Halt counting, keeping the configuration.
    fn stop(&self);

    /// Current countdown value in timer ticks.
    fn counter(&self) -> u32;

    /// Install the procedure run on every timer interrupt.
    fn set_callback(&self, callback: TimerCallback);

    /// Remove the installed procedure, if any.
    fn clear_callback(&self);

    /// Return the timer to its reset configuration.
    fn deinit(&self);
}
