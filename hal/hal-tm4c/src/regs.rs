//! TM4C123GH6PM core peripheral register map.

use hal::Reg;

/// SysTick control and status.
pub const STCTRL: Reg = Reg::at(0xE000_E010);
/// SysTick reload value.
pub const STRELOAD: Reg = Reg::at(0xE000_E014);
/// SysTick current value.
pub const STCURRENT: Reg = Reg::at(0xE000_E018);

pub const STCTRL_ENABLE: u32 = 1 << 0;
pub const STCTRL_INTEN: u32 = 1 << 1;
pub const STCTRL_CLK_SRC: u32 = 1 << 2;
/// Set when the counter reached zero; cleared by reading STCTRL.
pub const STCTRL_COUNT: u32 = 1 << 16;

/// Reload and current registers are 24 bits wide.
pub const STRELOAD_MAX: u32 = 0x00FF_FFFF;

/// Interrupt set-enable, lines 0..32. Four more banks follow.
pub const EN0: Reg = Reg::at(0xE000_E100);
/// Interrupt clear-enable, lines 0..32.
pub const DIS0: Reg = Reg::at(0xE000_E180);
/// Interrupt set-pending, lines 0..32.
pub const PEND0: Reg = Reg::at(0xE000_E200);
/// Interrupt clear-pending, lines 0..32.
pub const UNPEND0: Reg = Reg::at(0xE000_E280);
/// Interrupt priority, lines 0..4. Thirty-nine more registers follow.
pub const PRI0: Reg = Reg::at(0xE000_E400);

/// Memory management, bus and usage fault priorities.
pub const SYSPRI1: Reg = Reg::at(0xE000_ED18);
/// SVCall priority.
pub const SYSPRI2: Reg = Reg::at(0xE000_ED1C);
/// Debug monitor, PendSV and SysTick priorities.
pub const SYSPRI3: Reg = Reg::at(0xE000_ED20);
/// System handler control and state.
pub const SYSHNDCTRL: Reg = Reg::at(0xE000_ED24);

pub const SYSHNDCTRL_MEM: u32 = 1 << 16;
pub const SYSHNDCTRL_BUS: u32 = 1 << 17;
pub const SYSHNDCTRL_USAGE: u32 = 1 << 18;
