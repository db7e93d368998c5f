#![no_std]
#![no_main]

//! Cadence firmware entry point.
//!
//! Brings up the LED pins, boots the kernel on the SysTick timer, registers the default apps
//! and starts the scheduler. The processor then sleeps between SysTick exceptions.

mod interrupts;
mod logger;

use core::cell::RefCell;
use cortex_m::interrupt::{self, Mutex};
use cortex_m::peripheral::SYST;
use cortex_m_rt::entry;
use hal_interface::{ClockControl, Gpio, MmioGpio, MmioRcc};
use kernel::{
    BootConfig, ClockSource, Hertz, KernelError, KernelResult, Milliseconds, Scheduler,
    TimerConfig,
};
use panic_semihosting as _;

/// Number of task slots of the scheduler.
const K_TASK_SLOTS: usize = 8;

/// STM32F103 on its 8 MHz oscillator, SysTick at 1 MHz, one macro tick per second.
const K_BOOT_CONFIG: BootConfig = BootConfig {
    timer: TimerConfig {
        clock_source: ClockSource::ProcessorDiv8,
        interrupt_enabled: true,
    },
    core_frequency: Hertz(8_000_000),
    macro_tick: Milliseconds(1000),
};

/// Scheduler reached by the SysTick exception handler.
pub(crate) static G_SCHEDULER: Mutex<RefCell<Option<Scheduler<SYST, K_TASK_SLOTS>>>> =
    Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    logger::init();

    if let Err(l_err) = start() {
        panic!("{}", l_err.to_string());
    }

    loop {
        cortex_m::asm::wfi();
    }
}

fn start() -> KernelResult<()> {
    let l_core = cortex_m::Peripherals::take()
        .ok_or(KernelError::InvalidConfig("core peripherals already taken"))?;
    let l_device = stm32f1::stm32f103::Peripherals::take()
        .ok_or(KernelError::InvalidConfig("device peripherals already taken"))?;

    kernel_apps::init_led_pins(
        &mut ClockControl::new(MmioRcc::new(l_device.RCC)),
        &mut Gpio::new(MmioGpio),
    )?;

    let mut l_scheduler = kernel::boot::<SYST, K_TASK_SLOTS>(l_core.SYST, K_BOOT_CONFIG)?;
    kernel_apps::init_kernel_apps(&mut l_scheduler, kernel_apps::led_toggle)?;
    let l_macro_tick = K_BOOT_CONFIG.macro_tick_ticks()?;

    // The exception handler sees the scheduler only once it is started
    interrupt::free(|cs| {
        let mut l_slot = G_SCHEDULER.borrow(cs).borrow_mut();
        l_slot.insert(l_scheduler).start(l_macro_tick)
    })
}
