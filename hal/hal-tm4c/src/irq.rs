//! Interrupt line, priority level and exception identifiers.

use core::fmt;

use hal::{HalError, HalResult};

/// Interrupt line number, `0..Irq::COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Irq(u8);

impl Irq {
    /// Number of lines covered by the enable registers.
    pub const COUNT: u32 = 160;

    /// Interrupt line of the 16/32-bit general purpose timer 0A.
    pub const TIMER0A: Irq = Irq(19);

    /// Validate a raw line number.
    pub fn new(line: u32) -> HalResult<Self> {
        if line < Self::COUNT {
            Ok(Irq(line as u8))
        } else {
            Err(HalError::InvalidLine)
        }
    }

    /// Raw line number.
    pub const fn number(self) -> u32 {
        self.0 as u32
    }

    /// Iterate over every line.
    pub fn all() -> impl Iterator<Item = Irq> {
        (0..Self::COUNT as u8).map(Irq)
    }
}

impl TryFrom<u32> for Irq {
    type Error = HalError;

    fn try_from(line: u32) -> HalResult<Self> {
        Irq::new(line)
    }
}

impl fmt::Display for Irq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IRQ{}", self.0)
    }
}

/// Three-bit priority level; 0 is the most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Priority(u8);

impl Priority {
    /// Most urgent level.
    pub const HIGHEST: Priority = Priority(0);

    /// Least urgent level.
    pub const LOWEST: Priority = Priority(Self::MASK as u8);

    /// Width of the implemented priority field.
    pub const BITS: u32 = 3;

    pub(crate) const MASK: u32 = (1 << Self::BITS) - 1;

    /// Validate a raw priority level.
    pub fn new(level: u8) -> HalResult<Self> {
        if u32::from(level) <= Self::MASK {
            Ok(Priority(level))
        } else {
            Err(HalError::InvalidPriority)
        }
    }

    /// Raw priority level.
    pub const fn level(self) -> u8 {
        self.0
    }

    /// Extract the field at `shift` from a priority register value.
    pub(crate) const fn from_field(value: u32, shift: u32) -> Self {
        Priority(((value >> shift) & Self::MASK) as u8)
    }

    /// Replace the field at `shift` in a priority register value.
    pub(crate) const fn insert_into(self, value: u32, shift: u32) -> u32 {
        (value & !(Self::MASK << shift)) | ((self.0 as u32) << shift)
    }

    /// Iterate over every level, most urgent first.
    pub fn all() -> impl Iterator<Item = Priority> {
        (0..=Self::MASK as u8).map(Priority)
    }
}

impl TryFrom<u8> for Priority {
    type Error = HalError;

    fn try_from(level: u8) -> HalResult<Self> {
        Priority::new(level)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Priority({})", self.0)
    }
}

/// Processor exceptions with a configurable priority.
///
/// Discriminants are the architectural exception numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Exception {
    MemoryManagement = 4,
    BusFault = 5,
    UsageFault = 6,
    SVCall = 11,
    DebugMonitor = 12,
    PendSV = 14,
    SysTick = 15,
}

impl Exception {
    pub const ALL: [Exception; 7] = [
        Exception::MemoryManagement,
        Exception::BusFault,
        Exception::UsageFault,
        Exception::SVCall,
        Exception::DebugMonitor,
        Exception::PendSV,
        Exception::SysTick,
    ];

    /// Architectural exception number.
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Whether the handler can be enabled and disabled in software.
    ///
    /// Only the three configurable faults have an enable bit; the others are
    /// always active.
    pub const fn is_controllable(self) -> bool {
        matches!(
            self,
            Exception::MemoryManagement | Exception::BusFault | Exception::UsageFault
        )
    }
}

impl TryFrom<u8> for Exception {
    type Error = HalError;

    fn try_from(number: u8) -> HalResult<Self> {
        Exception::ALL
            .into_iter()
            .find(|exception| exception.number() == number)
            .ok_or(HalError::InvalidExceptionKind)
    }
}
