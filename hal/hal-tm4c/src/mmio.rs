//! Memory-mapped register bank for the real device.

use hal::{Reg, RegisterBank};

/// Direct volatile access to the core peripheral address space.
///
/// Only meaningful when running on the target: on any other machine the
/// addresses in [`crate::regs`] are not mapped.
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// The caller must be running on a TM4C123 (or another ARMv7-M core with
    /// the same system control space) and must not create aliasing drivers
    /// that race on the same registers outside of interrupt preemption.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBank for Mmio {
    fn read(&self, reg: Reg) -> u32 {
        // SAFETY: `Mmio::new` requires the system control space to be mapped.
        unsafe { core::ptr::read_volatile(reg.addr() as usize as *const u32) }
    }

    fn write(&self, reg: Reg, value: u32) {
        // SAFETY: as for `read`.
        unsafe { core::ptr::write_volatile(reg.addr() as usize as *mut u32, value) }
    }

    fn barrier(&self) {
        #[cfg(target_arch = "arm")]
        {
            cortex_m::asm::dsb();
            cortex_m::asm::isb();
        }
    }
}
