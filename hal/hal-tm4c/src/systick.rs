//! SysTick countdown timer driver.
//!
//! The timer runs from the 16 MHz system clock. It either raises the SysTick
//! exception on every expiry, calling the installed callback from
//! [`SysTick::handler`], or is polled by [`SysTick::start_busy_wait`].

use core::cell::Cell;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use hal::timer::{Timer, TimerCallback, TimerMode, TimerState};
use hal::{HalError, HalResult, RegisterBank};
use log::{debug, trace, warn};

use crate::regs::{
    STCTRL, STCTRL_CLK_SRC, STCTRL_COUNT, STCTRL_ENABLE, STCTRL_INTEN, STCURRENT, STRELOAD,
    STRELOAD_MAX,
};

/// Timer input clock in hertz.
pub const CLOCK_HZ: u32 = 16_000_000;

/// Timer ticks per millisecond.
pub const TICKS_PER_MS: u32 = CLOCK_HZ / 1_000;

/// Longest period the 24-bit reload register can encode, in milliseconds.
pub const MAX_PERIOD_MS: u32 = (STRELOAD_MAX + 1) / TICKS_PER_MS;

/// What [`SysTick::start_busy_wait`] does with the timer once the delay has
/// elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusyWaitExit {
    /// Keep counting, as the original firmware did.
    #[default]
    LeaveRunning,
    /// Clear the enable bit before returning.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SysTickConfig {
    pub busy_wait_exit: BusyWaitExit,
}

impl SysTickConfig {
    pub const fn new() -> Self {
        Self {
            busy_wait_exit: BusyWaitExit::LeaveRunning,
        }
    }

    pub const fn with_busy_wait_exit(mut self, exit: BusyWaitExit) -> Self {
        self.busy_wait_exit = exit;
        self
    }
}

/// Reload value for a `period_ms` countdown.
///
/// Periods outside `1..=MAX_PERIOD_MS` are rejected with
/// [`HalError::InvalidPeriod`].
pub fn reload_for(period_ms: u32) -> HalResult<u32> {
    if (1..=MAX_PERIOD_MS).contains(&period_ms) {
        Ok(period_ms * TICKS_PER_MS - 1)
    } else {
        Err(HalError::InvalidPeriod)
    }
}

/// Driver for the SysTick timer.
pub struct SysTick<R> {
    regs: R,
    config: SysTickConfig,
    callback: Mutex<Cell<Option<TimerCallback>>>,
}

impl<R: RegisterBank> SysTick<R> {
    /// Driver with the default configuration and no callback installed.
    ///
    /// Does not touch the hardware.
    pub const fn new(regs: R) -> Self {
        Self::with_config(regs, SysTickConfig::new())
    }

    pub const fn with_config(regs: R, config: SysTickConfig) -> Self {
        Self {
            regs,
            config,
            callback: Mutex::new(Cell::new(None)),
        }
    }

    pub fn config(&self) -> SysTickConfig {
        self.config
    }

    /// Start periodic interrupts every `period_ms`.
    ///
    /// An out-of-range period leaves every register, including a previously
    /// configured reload value, untouched.
    pub fn init(&self, period_ms: u32) -> HalResult<()> {
        let reload = self.checked_reload(period_ms)?;
        self.configure(reload, STCTRL_ENABLE | STCTRL_INTEN | STCTRL_CLK_SRC);
        debug!("systick: periodic every {} ms (reload {:#x})", period_ms, reload);
        Ok(())
    }

    /// Count down `period_ms` with the interrupt disabled and spin until the
    /// count flag is observed.
    ///
    /// Cannot be cancelled. Must not be called from the timer callback.
    pub fn start_busy_wait(&self, period_ms: u32) -> HalResult<()> {
        let reload = self.checked_reload(period_ms)?;
        self.busy_wait(reload);
        trace!("systick: busy-wait of {} ms elapsed", period_ms);
        Ok(())
    }

    /// Install the procedure run by [`SysTick::handler`].
    pub fn set_callback(&self, callback: TimerCallback) {
        critical_section::with(|cs| self.callback.borrow(cs).set(Some(callback)));
    }

    pub fn clear_callback(&self) {
        critical_section::with(|cs| self.callback.borrow(cs).set(None));
    }

    pub fn has_callback(&self) -> bool {
        critical_section::with(|cs| self.callback.borrow(cs).get().is_some())
    }

    /// Body of the SysTick exception.
    ///
    /// Runs the callback, if any, then clears the current value, which also
    /// clears the count flag.
    pub fn handler(&self) {
        let callback = critical_section::with(|cs| self.callback.borrow(cs).get());
        if let Some(callback) = callback {
            callback();
        }
        self.regs.write(STCURRENT, 0);
    }

    /// Set the enable bit only.
    pub fn start(&self) {
        self.regs.set_bits(STCTRL, STCTRL_ENABLE);
    }

    /// Clear the enable bit only.
    pub fn stop(&self) {
        self.regs.clear_bits(STCTRL, STCTRL_ENABLE);
    }

    /// Zero every timer register and drop the callback.
    pub fn deinit(&self) {
        self.regs.write(STCTRL, 0);
        self.regs.write(STRELOAD, 0);
        self.regs.write(STCURRENT, 0);
        self.clear_callback();
        debug!("systick: deinitialized");
    }

    /// Current countdown value in ticks.
    pub fn counter(&self) -> u32 {
        self.regs.read(STCURRENT) & STRELOAD_MAX
    }

    pub fn reload(&self) -> u32 {
        self.regs.read(STRELOAD) & STRELOAD_MAX
    }

    /// Lifecycle state, derived from the control and reload registers.
    ///
    /// Reading the control register consumes a pending count flag.
    pub fn state(&self) -> TimerState {
        let control = self.regs.read(STCTRL);
        let mode = if control & STCTRL_INTEN != 0 {
            TimerMode::Periodic
        } else {
            TimerMode::BusyWait
        };

        if control & STCTRL_ENABLE != 0 {
            TimerState::Running(mode)
        } else if self.reload() == 0 {
            TimerState::Uninitialized
        } else {
            TimerState::Stopped(mode)
        }
    }

    fn checked_reload(&self, period_ms: u32) -> HalResult<u32> {
        reload_for(period_ms).map_err(|err| {
            warn!(
                "systick: period {} ms outside 1..={} ms, configuration kept",
                period_ms, MAX_PERIOD_MS
            );
            err
        })
    }

    fn configure(&self, reload: u32, control: u32) {
        self.regs.write(STCTRL, 0);
        self.regs.write(STRELOAD, reload);
        self.regs.write(STCURRENT, 0);
        self.regs.write(STCTRL, control);
    }

    fn busy_wait(&self, reload: u32) {
        self.configure(reload, STCTRL_ENABLE | STCTRL_CLK_SRC);
        while self.regs.read(STCTRL) & STCTRL_COUNT == 0 {
            core::hint::spin_loop();
        }
        if self.config.busy_wait_exit == BusyWaitExit::Stop {
            self.stop();
        }
    }

    fn busy_wait_ms(&self, mut ms: u32) {
        while ms > 0 {
            let chunk = ms.min(MAX_PERIOD_MS);
            self.busy_wait(chunk * TICKS_PER_MS - 1);
            ms -= chunk;
        }
    }
}

impl<R: RegisterBank> Timer for SysTick<R> {
    type Error = HalError;

    fn start_periodic(&self, period_ms: u32) -> HalResult<()> {
        self.init(period_ms)
    }

    fn start_busy_wait(&self, period_ms: u32) -> HalResult<()> {
        SysTick::start_busy_wait(self, period_ms)
    }

    fn start(&self) {
        SysTick::start(self)
    }

    fn stop(&self) {
        SysTick::stop(self)
    }

    fn counter(&self) -> u32 {
        SysTick::counter(self)
    }

    fn set_callback(&self, callback: TimerCallback) {
        SysTick::set_callback(self, callback)
    }

    fn clear_callback(&self) {
        SysTick::clear_callback(self)
    }

    fn deinit(&self) {
        SysTick::deinit(self)
    }
}

/// Blocking delays on the busy-wait path, split into chunks of at most
/// [`MAX_PERIOD_MS`] and rounded up to whole milliseconds.
impl<R: RegisterBank> DelayNs for SysTick<R> {
    fn delay_ns(&mut self, ns: u32) {
        self.busy_wait_ms(ns.div_ceil(1_000_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.busy_wait_ms(us.div_ceil(1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.busy_wait_ms(ms);
    }
}
