//! Helpers shared by the integration tests.
#![allow(dead_code)]

use hal_interface::SimulatedSysTick;
use kernel::{
    BootConfig, ClockSource, Hertz, KernelResult, Milliseconds, Scheduler, TimerConfig,
    TimerService,
};
use std::cell::RefCell;

pub const K_BOOT_CONFIG: BootConfig = BootConfig {
    timer: TimerConfig {
        clock_source: ClockSource::ProcessorDiv8,
        interrupt_enabled: true,
    },
    core_frequency: Hertz(8_000),
    macro_tick: Milliseconds(100),
};

thread_local! {
    static FIRED: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
}

/// Task body recording its parameter.
pub fn record(p_id: u32) -> KernelResult<()> {
    FIRED.with(|l_f| l_f.borrow_mut().push(p_id));
    Ok(())
}

/// Returns and clears the parameters recorded since the last call.
pub fn take_fired() -> Vec<u32> {
    FIRED.with(|l_f| l_f.borrow_mut().drain(..).collect())
}

/// Scheduler over a simulated timer, initialized but not started.
pub fn scheduler<const N: usize>() -> Scheduler<SimulatedSysTick, N> {
    let mut l_timer = TimerService::new(SimulatedSysTick::new());
    l_timer.initialize(K_BOOT_CONFIG.timer).unwrap();
    Scheduler::new(l_timer)
}

/// Runs the simulated timer tick by tick, delivering interrupts as the exception handler would.
/// Returns the number of interrupts delivered.
pub fn run<const N: usize>(p_sched: &mut Scheduler<SimulatedSysTick, N>, p_ticks: u32) -> u32 {
    let mut l_interrupts = 0;
    for _ in 0..p_ticks {
        p_sched.timer().registers().advance(1);
        if p_sched.timer().registers().take_pending() {
            p_sched.on_interrupt();
            l_interrupts += 1;
        }
    }
    l_interrupts
}
