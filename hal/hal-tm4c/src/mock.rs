//! In-memory register bank for host testing.
//!
//! Plain registers behave like memory. The registers with hardware side
//! effects are modelled:
//!
//! - reading `STCTRL` returns and then clears the COUNT flag,
//! - writing `STCURRENT` stores zero and clears the COUNT flag,
//! - `STRELOAD` keeps only its low 24 bits,
//! - the enable and pending banks are write-one-to-set / write-one-to-clear
//!   pairs sharing one state word per bank.
//!
//! The countdown itself is driven explicitly, either with [`MockRegisters::expire`]
//! or by arming an expiry after a number of `STCTRL` polls.

use core::cell::RefCell;

use critical_section::Mutex;
use hal::{Reg, RegisterBank};
use heapless::FnvIndexMap;

use crate::regs::{
    DIS0, EN0, PEND0, STCTRL, STCTRL_COUNT, STCTRL_ENABLE, STCURRENT, STRELOAD, STRELOAD_MAX,
    UNPEND0,
};

/// Enough slots for every register the drivers touch.
const SLOTS: usize = 64;

/// Span of one five-register enable or pending bank, in bytes.
const BANK_SPAN: u32 = 5 * 4;

struct MockState {
    values: FnvIndexMap<u32, u32, SLOTS>,
    count_flag: bool,
    expire_every: Option<u32>,
    polls_left: u32,
    control_reads: u32,
    count_observed: u32,
    writes: u32,
}

/// Register bank backed by a map from address to value.
pub struct MockRegisters {
    state: Mutex<RefCell<MockState>>,
}

enum Target {
    Plain(u32),
    SetBank(u32),
    ClearBank(u32),
}

fn classify(reg: Reg) -> Target {
    let addr = reg.addr();
    let within = |base: Reg| addr >= base.addr() && addr < base.addr() + BANK_SPAN;

    if within(EN0) || within(PEND0) {
        Target::SetBank(addr)
    } else if within(DIS0) {
        Target::ClearBank(EN0.addr() + (addr - DIS0.addr()))
    } else if within(UNPEND0) {
        Target::ClearBank(PEND0.addr() + (addr - UNPEND0.addr()))
    } else {
        Target::Plain(addr)
    }
}

impl MockState {
    fn get(&self, addr: u32) -> u32 {
        self.values.get(&addr).copied().unwrap_or(0)
    }

    fn set(&mut self, addr: u32, value: u32) {
        if self.values.insert(addr, value).is_err() {
            panic!("mock register map full at {:#010x}", addr);
        }
    }
}

impl MockRegisters {
    /// All registers read as zero.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(MockState {
                values: FnvIndexMap::new(),
                count_flag: false,
                expire_every: None,
                polls_left: 0,
                control_reads: 0,
                count_observed: 0,
                writes: 0,
            })),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        critical_section::with(|cs| f(&mut *self.state.borrow_ref_mut(cs)))
    }

    /// Raise the COUNT flag as if the counter just reached zero.
    pub fn expire(&self) {
        self.with_state(|state| state.count_flag = true);
    }

    /// Raise the COUNT flag on every `polls`-th read of `STCTRL` made while
    /// the timer is enabled.
    pub fn expire_after_polls(&self, polls: u32) {
        self.with_state(|state| {
            state.expire_every = Some(polls.max(1));
            state.polls_left = polls.max(1);
        });
    }

    /// Raw register value without read side effects.
    pub fn peek(&self, reg: Reg) -> u32 {
        self.with_state(|state| {
            let addr = match classify(reg) {
                Target::Plain(addr) | Target::SetBank(addr) | Target::ClearBank(addr) => addr,
            };
            let value = state.get(addr);
            if reg == STCTRL && state.count_flag {
                value | STCTRL_COUNT
            } else {
                value
            }
        })
    }

    /// Store a raw value without write side effects and without counting it
    /// as a driver write.
    pub fn poke(&self, reg: Reg, value: u32) {
        self.with_state(|state| state.set(reg.addr(), value));
    }

    /// Whether the COUNT flag is set and not yet consumed by a read.
    pub fn count_flag(&self) -> bool {
        self.with_state(|state| state.count_flag)
    }

    /// Number of `STCTRL` reads so far.
    pub fn control_reads(&self) -> u32 {
        self.with_state(|state| state.control_reads)
    }

    /// Number of `STCTRL` reads that returned the COUNT flag set.
    pub fn count_observed(&self) -> u32 {
        self.with_state(|state| state.count_observed)
    }

    /// Number of writes made through [`RegisterBank::write`].
    pub fn writes(&self) -> u32 {
        self.with_state(|state| state.writes)
    }

    /// Copy of every stored register, keyed by address.
    pub fn snapshot(&self) -> FnvIndexMap<u32, u32, SLOTS> {
        self.with_state(|state| state.values.clone())
    }
}

impl Default for MockRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank for MockRegisters {
    fn read(&self, reg: Reg) -> u32 {
        self.with_state(|state| {
            if reg == STCTRL {
                let control = state.get(STCTRL.addr());
                state.control_reads += 1;

                if control & STCTRL_ENABLE != 0 {
                    if let Some(every) = state.expire_every {
                        state.polls_left -= 1;
                        if state.polls_left == 0 {
                            state.count_flag = true;
                            state.polls_left = every;
                        }
                    }
                }

                if core::mem::take(&mut state.count_flag) {
                    state.count_observed += 1;
                    return control | STCTRL_COUNT;
                }
                return control;
            }

            match classify(reg) {
                Target::Plain(addr) | Target::SetBank(addr) | Target::ClearBank(addr) => {
                    state.get(addr)
                }
            }
        })
    }

    fn write(&self, reg: Reg, value: u32) {
        self.with_state(|state| {
            state.writes += 1;

            if reg == STCTRL {
                state.set(STCTRL.addr(), value & !STCTRL_COUNT);
            } else if reg == STCURRENT {
                state.set(STCURRENT.addr(), 0);
                state.count_flag = false;
            } else if reg == STRELOAD {
                state.set(STRELOAD.addr(), value & STRELOAD_MAX);
            } else {
                match classify(reg) {
                    Target::Plain(addr) => state.set(addr, value),
                    Target::SetBank(addr) => {
                        let current = state.get(addr);
                        state.set(addr, current | value);
                    }
                    Target::ClearBank(addr) => {
                        let current = state.get(addr);
                        state.set(addr, current & !value);
                    }
                }
            }
        })
    }
}
