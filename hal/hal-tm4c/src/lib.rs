//! TM4C123 HAL implementation
//!
//! Drivers for the two Cortex-M4F core peripherals of the TM4C123GH6PM that
//! the HAL traits cover: the SysTick countdown timer and the NVIC.
//!
//! Both drivers are generic over a [`hal::RegisterBank`]. On the target they
//! run on [`Mmio`]; on the host the `mock` feature provides an in-memory bank.
//!
//! ## Features
//! - `tm4c123` - process-wide [`SYSTICK`] and [`NVIC`] instances on ARM targets
//! - `mock` - [`mock::MockRegisters`] for host tests
//! - `defmt` - `defmt::Format` for the public value types
//! - `std` - `std::error::Error` for [`hal::HalError`]
//!
//! ## Example
//! ```ignore
//! use hal_tm4c::{Irq, Priority, NVIC, SYSTICK};
//!
//! fn on_tick() {}
//!
//! SYSTICK.set_callback(on_tick);
//! SYSTICK.init(10).unwrap();
//! NVIC.set_priority_irq(Irq::TIMER0A, Priority::new(2).unwrap());
//! NVIC.enable_irq(Irq::TIMER0A);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub mod irq;
pub mod mmio;
pub mod nvic;
pub mod regs;
pub mod systick;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use irq::{Exception, Irq, Priority};
pub use mmio::Mmio;
pub use nvic::{IrqPriorityWrite, Nvic, NvicConfig};
pub use systick::{BusyWaitExit, SysTick, SysTickConfig};

/// The SysTick timer of the running core.
///
/// Call [`SysTick::handler`] from the SysTick exception vector.
#[cfg(all(feature = "tm4c123", target_arch = "arm"))]
// SAFETY: this crate targets the TM4C123, whose system control space is
// always mapped.
pub static SYSTICK: SysTick<Mmio> = SysTick::new(unsafe { Mmio::new() });

/// The interrupt controller of the running core.
#[cfg(all(feature = "tm4c123", target_arch = "arm"))]
// SAFETY: as for `SYSTICK`.
pub static NVIC: Nvic<Mmio> = Nvic::new(unsafe { Mmio::new() });
