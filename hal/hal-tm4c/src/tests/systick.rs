use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;
use hal::timer::{Timer, TimerMode, TimerState};
use hal::HalError;

use crate::mock::MockRegisters;
use crate::regs::{STCTRL, STCTRL_CLK_SRC, STCTRL_ENABLE, STCTRL_INTEN, STCURRENT, STRELOAD};
use crate::systick::{reload_for, BusyWaitExit, SysTick, SysTickConfig, MAX_PERIOD_MS};

const PERIODIC: u32 = STCTRL_ENABLE | STCTRL_INTEN | STCTRL_CLK_SRC;

#[test]
fn max_period_fits_24_bit_reload() {
    assert_eq!(MAX_PERIOD_MS, 1048);
    assert_eq!(reload_for(1048), Ok(16_767_999));
    assert_eq!(reload_for(1049), Err(HalError::InvalidPeriod));
    assert_eq!(reload_for(0), Err(HalError::InvalidPeriod));
}

#[test]
fn init_programs_reload_for_every_valid_period() {
    let regs = MockRegisters::new();
    let timer = SysTick::new(&regs);

    for ms in 1..=MAX_PERIOD_MS {
        regs.poke(STCURRENT, 42);
        timer.init(ms).unwrap();

        assert_eq!(regs.peek(STRELOAD), ms * 16_000 - 1, "period {ms} ms");
        assert_eq!(regs.peek(STCURRENT), 0);
        assert_eq!(regs.peek(STCTRL), PERIODIC);
    }
}

#[test]
fn init_rejects_period_and_keeps_configuration() {
    let regs = MockRegisters::new();
    let timer = SysTick::new(&regs);
    timer.init(250).unwrap();
    regs.poke(STCURRENT, 1_234);
    let writes = regs.writes();

    for ms in [0, 1049, 5_000, u32::MAX] {
        assert_eq!(timer.init(ms), Err(HalError::InvalidPeriod));
    }

    assert_eq!(regs.writes(), writes);
    assert_eq!(regs.peek(STRELOAD), 250 * 16_000 - 1);
    assert_eq!(regs.peek(STCURRENT), 1_234);
    assert_eq!(regs.peek(STCTRL), PERIODIC);
}

#[test]
fn handler_without_callback_clears_current_and_count() {
    let regs = MockRegisters::new();
    let timer = SysTick::new(&regs);
    timer.init(1).unwrap();
    regs.poke(STCURRENT, 999);
    regs.expire();

    timer.handler();

    assert_eq!(regs.peek(STCURRENT), 0);
    assert!(!regs.count_flag());
}

static HANDLER_CALLS: AtomicU32 = AtomicU32::new(0);

fn count_handler_call() {
    HANDLER_CALLS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn handler_runs_callback_once_then_clears_current() {
    let regs = MockRegisters::new();
    let timer = SysTick::new(&regs);
    timer.set_callback(count_handler_call);
    timer.init(10).unwrap();
    regs.poke(STCURRENT, 77);

    timer.handler();

    assert_eq!(HANDLER_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(regs.peek(STCURRENT), 0);

    timer.handler();
    assert_eq!(HANDLER_CALLS.load(Ordering::SeqCst), 2);
}

static FIRST_CALLS: AtomicU32 = AtomicU32::new(0);
static SECOND_CALLS: AtomicU32 = AtomicU32::new(0);

fn first() {
    FIRST_CALLS.fetch_add(1, Ordering::SeqCst);
}

fn second() {
    SECOND_CALLS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn callback_can_be_replaced_while_running() {
    let regs = MockRegisters::new();
    let timer = SysTick::new(&regs);
    timer.init(5).unwrap();

    timer.set_callback(first);
    timer.handler();
    timer.set_callback(second);
    timer.handler();
    timer.clear_callback();
    timer.handler();

    assert_eq!(FIRST_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(SECOND_CALLS.load(Ordering::SeqCst), 1);
    assert!(!timer.has_callback());
}

#[test]
fn start_and_stop_toggle_only_enable() {
    let regs = MockRegisters::new();
    let timer = SysTick::new(&regs);
    timer.init(100).unwrap();
    regs.poke(STCURRENT, 4_321);

    timer.stop();
    assert_eq!(regs.peek(STCTRL), STCTRL_INTEN | STCTRL_CLK_SRC);
    assert_eq!(regs.peek(STRELOAD), 100 * 16_000 - 1);
    assert_eq!(regs.peek(STCURRENT), 4_321);

    timer.start();
    assert_eq!(regs.peek(STCTRL), PERIODIC);
    assert_eq!(regs.peek(STRELOAD), 100 * 16_000 - 1);
    assert_eq!(regs.peek(STCURRENT), 4_321);
}

#[test]
fn state_follows_lifecycle() {
    let regs = MockRegisters::new();
    let timer = SysTick::new(&regs);
    assert_eq!(timer.state(), TimerState::Uninitialized);

    timer.init(20).unwrap();
    assert_eq!(timer.state(), TimerState::Running(TimerMode::Periodic));

    timer.stop();
    assert_eq!(timer.state(), TimerState::Stopped(TimerMode::Periodic));

    timer.start();
    assert_eq!(timer.state(), TimerState::Running(TimerMode::Periodic));

    timer.deinit();
    assert_eq!(timer.state(), TimerState::Uninitialized);
}

#[test]
fn busy_wait_returns_after_count_and_leaves_timer_running() {
    let regs = MockRegisters::new();
    let timer = SysTick::new(&regs);
    regs.expire_after_polls(3);

    timer.start_busy_wait(7).unwrap();

    assert_eq!(regs.count_observed(), 1);
    assert_eq!(regs.control_reads(), 3);
    assert_eq!(regs.peek(STRELOAD), 7 * 16_000 - 1);
    assert_eq!(regs.peek(STCTRL), STCTRL_ENABLE | STCTRL_CLK_SRC);
    assert_eq!(timer.state(), TimerState::Running(TimerMode::BusyWait));
}

#[test]
fn busy_wait_can_stop_timer_on_exit() {
    let regs = MockRegisters::new();
    let config = SysTickConfig::new().with_busy_wait_exit(BusyWaitExit::Stop);
    let timer = SysTick::with_config(&regs, config);
    regs.expire_after_polls(2);

    timer.start_busy_wait(1).unwrap();

    assert_eq!(regs.count_observed(), 1);
    assert_eq!(regs.peek(STCTRL) & STCTRL_ENABLE, 0);
    assert_eq!(timer.state(), TimerState::Stopped(TimerMode::BusyWait));
}

#[test]
fn busy_wait_rejects_period_without_spinning() {
    let regs = MockRegisters::new();
    let timer = SysTick::new(&regs);
    regs.expire_after_polls(1);

    assert_eq!(timer.start_busy_wait(2_000), Err(HalError::InvalidPeriod));
    assert_eq!(regs.control_reads(), 0);
    assert_eq!(regs.writes(), 0);
}

static DEINIT_CALLS: AtomicU32 = AtomicU32::new(0);

fn count_deinit_call() {
    DEINIT_CALLS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn deinit_zeroes_registers_and_drops_callback() {
    let regs = MockRegisters::new();
    let timer = SysTick::new(&regs);
    timer.set_callback(count_deinit_call);
    timer.init(300).unwrap();
    regs.poke(STCURRENT, 55);

    timer.deinit();

    assert_eq!(regs.peek(STCTRL), 0);
    assert_eq!(regs.peek(STRELOAD), 0);
    assert_eq!(regs.peek(STCURRENT), 0);
    assert!(!timer.has_callback());

    timer.handler();
    assert_eq!(DEINIT_CALLS.load(Ordering::SeqCst), 0);
}

#[test]
fn delay_splits_long_waits_into_max_periods() {
    let regs = MockRegisters::new();
    let mut timer = SysTick::new(&regs);
    regs.expire_after_polls(1);

    timer.delay_ms(2_500);

    assert_eq!(regs.count_observed(), 3);
    assert_eq!(regs.peek(STRELOAD), 404 * 16_000 - 1);
}

#[test]
fn delay_rounds_up_to_whole_milliseconds() {
    let regs = MockRegisters::new();
    let mut timer = SysTick::new(&regs);
    regs.expire_after_polls(1);

    timer.delay_ns(1);
    assert_eq!(regs.peek(STRELOAD), 16_000 - 1);

    timer.delay_us(2_500);
    assert_eq!(regs.peek(STRELOAD), 3 * 16_000 - 1);
    assert_eq!(regs.count_observed(), 2);

    let writes = regs.writes();
    timer.delay_ms(0);
    assert_eq!(regs.writes(), writes);
}

fn configure_through_trait<T: Timer<Error = HalError>>(timer: &T) -> Result<u32, HalError> {
    timer.start_periodic(2)?;
    timer.stop();
    Ok(timer.counter())
}

#[test]
fn timer_trait_drives_systick() {
    let regs = MockRegisters::new();
    let timer = SysTick::new(&regs);

    assert_eq!(configure_through_trait(&timer), Ok(0));
    assert_eq!(regs.peek(STRELOAD), 2 * 16_000 - 1);
    assert_eq!(regs.peek(STCTRL), STCTRL_INTEN | STCTRL_CLK_SRC);
}
