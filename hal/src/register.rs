//! Register access abstraction
//!
//! Drivers never dereference raw addresses themselves. They go through a
//! [`RegisterBank`], which is either the real memory-mapped peripheral space
//! or an in-memory stand-in used on the host.

use core::fmt;

/// Address of a 32-bit memory-mapped register.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reg(u32);

impl Reg {
    /// Register at an absolute address.
    pub const fn at(addr: u32) -> Self {
        Self(addr)
    }

    /// Absolute address of the register.
    pub const fn addr(self) -> u32 {
        self.0
    }

    /// Register `index` words after this one.
    pub const fn word(self, index: u32) -> Self {
        Self(self.0 + index * 4)
    }
}

impl fmt::Debug for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reg({:#010x})", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Reg {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Reg({=u32:#x})", self.0);
    }
}

/// Capability to read and write 32-bit peripheral registers.
///
/// Accesses must behave as volatile: every call reaches the device, in
/// program order. Methods take `&self` because registers are shared with
/// interrupt handlers; implementations provide their own interior mutability.
pub trait RegisterBank {
    /// Read the current value of `reg`.
    fn read(&self, reg: Reg) -> u32;

    /// Store `value` into `reg`.
    fn write(&self, reg: Reg, value: u32);

    /// Read-modify-write `reg` through `f`.
    fn modify<F>(&self, reg: Reg, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(reg);
        self.write(reg, f(value));
    }

    /// Set the bits of `mask` in `reg`, leaving the others alone.
    fn set_bits(&self, reg: Reg, mask: u32) {
        self.modify(reg, |value| value | mask);
    }

    /// Clear the bits of `mask` in `reg`, leaving the others alone.
    fn clear_bits(&self, reg: Reg, mask: u32) {
        self.modify(reg, |value| value & !mask);
    }

    /// Complete outstanding register writes before the next instruction.
    fn barrier(&self) {}
}

impl<R: RegisterBank + ?Sized> RegisterBank for &R {
    fn read(&self, reg: Reg) -> u32 {
        (**self).read(reg)
    }

    fn write(&self, reg: Reg, value: u32) {
        (**self).write(reg, value)
    }

    fn barrier(&self) {
        (**self).barrier()
    }
}
