//! Nested vectored interrupt controller driver.
//!
//! Stateless: every call goes straight to the shared register bank. Line and
//! priority dispatch are table lookups rather than branch chains.

use hal::interrupt::{ExceptionController, InterruptController};
use hal::{HalError, HalResult, Reg, RegisterBank};
use log::{debug, trace, warn};

use crate::irq::{Exception, Irq, Priority};
use crate::regs::{
    DIS0, EN0, PEND0, PRI0, SYSHNDCTRL, SYSHNDCTRL_BUS, SYSHNDCTRL_MEM, SYSHNDCTRL_USAGE,
    SYSPRI1, SYSPRI2, SYSPRI3, UNPEND0,
};

const LINES_PER_BANK: u32 = 32;
const LINES_PER_PRIORITY_REG: u32 = 4;

/// (set, clear) register pair for each bank of 32 enable bits.
const ENABLE_BANKS: [(Reg, Reg); 5] = [
    (EN0, DIS0),
    (EN0.word(1), DIS0.word(1)),
    (EN0.word(2), DIS0.word(2)),
    (EN0.word(3), DIS0.word(3)),
    (EN0.word(4), DIS0.word(4)),
];

/// (set, clear) register pair for each bank of 32 pending bits.
const PENDING_BANKS: [(Reg, Reg); 5] = [
    (PEND0, UNPEND0),
    (PEND0.word(1), UNPEND0.word(1)),
    (PEND0.word(2), UNPEND0.word(2)),
    (PEND0.word(3), UNPEND0.word(3)),
    (PEND0.word(4), UNPEND0.word(4)),
];

/// Shift of the implemented priority bits, indexed by `line % 4`.
const IRQ_PRIORITY_SHIFT: [u32; 4] = [5, 13, 21, 29];

/// Priority register and field shift of each system exception.
pub(crate) const fn exception_priority_slot(exception: Exception) -> (Reg, u32) {
    match exception {
        Exception::MemoryManagement => (SYSPRI1, 5),
        Exception::BusFault => (SYSPRI1, 13),
        Exception::UsageFault => (SYSPRI1, 21),
        Exception::SVCall => (SYSPRI2, 29),
        Exception::DebugMonitor => (SYSPRI3, 5),
        Exception::PendSV => (SYSPRI3, 21),
        Exception::SysTick => (SYSPRI3, 29),
    }
}

/// Enable bit of a configurable fault in `SYSHNDCTRL`.
const fn handler_enable_bit(exception: Exception) -> Option<u32> {
    match exception {
        Exception::MemoryManagement => Some(SYSHNDCTRL_MEM),
        Exception::BusFault => Some(SYSHNDCTRL_BUS),
        Exception::UsageFault => Some(SYSHNDCTRL_USAGE),
        _ => None,
    }
}

fn bank_of(irq: Irq) -> (usize, u32) {
    let line = irq.number();
    ((line / LINES_PER_BANK) as usize, 1 << (line % LINES_PER_BANK))
}

pub(crate) fn priority_slot(irq: Irq) -> (Reg, u32) {
    let line = irq.number();
    (
        PRI0.word(line / LINES_PER_PRIORITY_REG),
        IRQ_PRIORITY_SHIFT[(line % LINES_PER_PRIORITY_REG) as usize],
    )
}

/// What [`Nvic::set_priority_irq`] does with the value it computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqPriorityWrite {
    /// Store the new field into the priority register.
    #[default]
    WriteBack,
    /// Compute the new register value and drop it, leaving the hardware
    /// unchanged. Reproduces the original firmware exactly.
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NvicConfig {
    pub irq_priority_write: IrqPriorityWrite,
}

impl NvicConfig {
    pub const fn new() -> Self {
        Self {
            irq_priority_write: IrqPriorityWrite::WriteBack,
        }
    }

    pub const fn with_irq_priority_write(mut self, write: IrqPriorityWrite) -> Self {
        self.irq_priority_write = write;
        self
    }
}

/// Driver for the interrupt controller and the system handler registers.
pub struct Nvic<R> {
    regs: R,
    config: NvicConfig,
}

impl<R: RegisterBank> Nvic<R> {
    pub const fn new(regs: R) -> Self {
        Self::with_config(regs, NvicConfig::new())
    }

    pub const fn with_config(regs: R, config: NvicConfig) -> Self {
        Self { regs, config }
    }

    pub fn config(&self) -> NvicConfig {
        self.config
    }

    pub fn enable_irq(&self, irq: Irq) {
        let (bank, mask) = bank_of(irq);
        self.regs.write(ENABLE_BANKS[bank].0, mask);
        debug!("nvic: enabled {}", irq);
    }

    /// Disable a line. Returns once the controller has seen the write.
    pub fn disable_irq(&self, irq: Irq) {
        let (bank, mask) = bank_of(irq);
        self.regs.write(ENABLE_BANKS[bank].1, mask);
        self.regs.barrier();
        debug!("nvic: disabled {}", irq);
    }

    pub fn is_enabled(&self, irq: Irq) -> bool {
        let (bank, mask) = bank_of(irq);
        self.regs.read(ENABLE_BANKS[bank].0) & mask != 0
    }

    pub fn set_pending(&self, irq: Irq) {
        let (bank, mask) = bank_of(irq);
        self.regs.write(PENDING_BANKS[bank].0, mask);
    }

    pub fn clear_pending(&self, irq: Irq) {
        let (bank, mask) = bank_of(irq);
        self.regs.write(PENDING_BANKS[bank].1, mask);
    }

    pub fn is_pending(&self, irq: Irq) -> bool {
        let (bank, mask) = bank_of(irq);
        self.regs.read(PENDING_BANKS[bank].0) & mask != 0
    }

    /// Set the priority of a line.
    ///
    /// With [`IrqPriorityWrite::Discard`] the register is read but never
    /// written.
    pub fn set_priority_irq(&self, irq: Irq, priority: Priority) {
        let (reg, shift) = priority_slot(irq);
        let value = priority.insert_into(self.regs.read(reg), shift);

        match self.config.irq_priority_write {
            IrqPriorityWrite::WriteBack => {
                self.regs.write(reg, value);
                debug!("nvic: {} priority {}", irq, priority.level());
            }
            IrqPriorityWrite::Discard => {
                trace!("nvic: {} priority {} discarded ({:#010x})", irq, priority.level(), value);
            }
        }
    }

    pub fn priority_irq(&self, irq: Irq) -> Priority {
        let (reg, shift) = priority_slot(irq);
        Priority::from_field(self.regs.read(reg), shift)
    }

    /// Enable the handler of a configurable fault.
    ///
    /// Exceptions without an enable bit are rejected with
    /// [`HalError::InvalidExceptionKind`] and nothing is written.
    pub fn enable_exception(&self, exception: Exception) -> HalResult<()> {
        let bit = self.enable_bit(exception)?;
        self.regs.set_bits(SYSHNDCTRL, bit);
        debug!("nvic: enabled {:?} handler", exception);
        Ok(())
    }

    pub fn disable_exception(&self, exception: Exception) -> HalResult<()> {
        let bit = self.enable_bit(exception)?;
        self.regs.clear_bits(SYSHNDCTRL, bit);
        debug!("nvic: disabled {:?} handler", exception);
        Ok(())
    }

    pub fn is_exception_enabled(&self, exception: Exception) -> HalResult<bool> {
        let bit = self.enable_bit(exception)?;
        Ok(self.regs.read(SYSHNDCTRL) & bit != 0)
    }

    pub fn set_priority_exception(&self, exception: Exception, priority: Priority) {
        let (reg, shift) = exception_priority_slot(exception);
        self.regs.modify(reg, |value| priority.insert_into(value, shift));
        debug!("nvic: {:?} priority {}", exception, priority.level());
    }

    pub fn priority_exception(&self, exception: Exception) -> Priority {
        let (reg, shift) = exception_priority_slot(exception);
        Priority::from_field(self.regs.read(reg), shift)
    }

    fn enable_bit(&self, exception: Exception) -> HalResult<u32> {
        handler_enable_bit(exception).ok_or_else(|| {
            warn!("nvic: {:?} has no enable bit", exception);
            HalError::InvalidExceptionKind
        })
    }
}

impl<R: RegisterBank> InterruptController for Nvic<R> {
    type Error = HalError;

    fn enable_interrupt(&self, irq_num: u32) -> HalResult<()> {
        self.enable_irq(Irq::new(irq_num)?);
        Ok(())
    }

    fn disable_interrupt(&self, irq_num: u32) -> HalResult<()> {
        self.disable_irq(Irq::new(irq_num)?);
        Ok(())
    }

    fn set_priority(&self, irq_num: u32, priority: u8) -> HalResult<()> {
        self.set_priority_irq(Irq::new(irq_num)?, Priority::new(priority)?);
        Ok(())
    }

    fn is_enabled(&self, irq_num: u32) -> HalResult<bool> {
        Ok(Nvic::is_enabled(self, Irq::new(irq_num)?))
    }

    fn is_pending(&self, irq_num: u32) -> HalResult<bool> {
        Ok(Nvic::is_pending(self, Irq::new(irq_num)?))
    }

    fn set_pending(&self, irq_num: u32) -> HalResult<()> {
        Nvic::set_pending(self, Irq::new(irq_num)?);
        Ok(())
    }

    fn clear_pending(&self, irq_num: u32) -> HalResult<()> {
        Nvic::clear_pending(self, Irq::new(irq_num)?);
        Ok(())
    }
}

impl<R: RegisterBank> ExceptionController for Nvic<R> {
    type Error = HalError;

    fn enable_exception(&self, exception: u8) -> HalResult<()> {
        Nvic::enable_exception(self, Exception::try_from(exception)?)
    }

    fn disable_exception(&self, exception: u8) -> HalResult<()> {
        Nvic::disable_exception(self, Exception::try_from(exception)?)
    }

    fn set_exception_priority(&self, exception: u8, priority: u8) -> HalResult<()> {
        self.set_priority_exception(Exception::try_from(exception)?, Priority::new(priority)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_banks_cover_consecutive_words() {
        assert_eq!(ENABLE_BANKS[4].0.addr(), 0xE000_E110);
        assert_eq!(ENABLE_BANKS[4].1.addr(), 0xE000_E190);
        assert_eq!(PENDING_BANKS[2].0.addr(), 0xE000_E208);
        assert_eq!(PENDING_BANKS[2].1.addr(), 0xE000_E288);
    }

    #[test]
    fn bank_dispatch_by_line() {
        let cases = [
            (0, 0, 1 << 0),
            (31, 0, 1 << 31),
            (32, 1, 1 << 0),
            (95, 2, 1 << 31),
            (159, 4, 1 << 31),
        ];
        for (line, bank, mask) in cases {
            assert_eq!(bank_of(Irq::new(line).unwrap()), (bank, mask), "line {line}");
        }
    }

    #[test]
    fn priority_slot_by_line() {
        assert_eq!(priority_slot(Irq::new(0).unwrap()), (PRI0, 5));
        assert_eq!(priority_slot(Irq::new(5).unwrap()), (Reg::at(0xE000_E404), 13));
        assert_eq!(priority_slot(Irq::new(19).unwrap()), (Reg::at(0xE000_E410), 29));
        assert_eq!(priority_slot(Irq::new(158).unwrap()), (Reg::at(0xE000_E49C), 21));
    }

    #[test]
    fn exception_table_shares_registers() {
        assert_eq!(exception_priority_slot(Exception::UsageFault), (SYSPRI1, 21));
        assert_eq!(exception_priority_slot(Exception::SVCall), (SYSPRI2, 29));
        assert_eq!(exception_priority_slot(Exception::SysTick), (SYSPRI3, 29));
        assert_eq!(handler_enable_bit(Exception::PendSV), None);
    }
}
