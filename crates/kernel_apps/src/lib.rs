#![cfg_attr(not(test), no_std)]

//! Default bring-up tasks: three LEDs blinking at different rates.

use hal_interface::{ClockControl, Gpio, GpioRegisters, RccRegisters, SysTickRegisters};
use kernel::{KernelError, KernelResult, Scheduler, TaskCall, WorkParam};
use log::info;

mod led_blink;

#[cfg(feature = "cortex-m")]
pub use led_blink::led_toggle;
pub use led_blink::{pin_from_id, pin_id, toggle_led};

/// GPIO port numbers.
const K_PORT_A: u8 = 0;
const K_PORT_C: u8 = 2;

/// APB2 bus number and the clock enable bits of GPIO ports A and C.
const K_APB2: u8 = 2;
const K_IOPA_EN: u8 = 2;
const K_IOPC_EN: u8 = 4;

/// Static description of a default app.
#[derive(Debug, Clone, Copy)]
pub struct AppConfig {
    pub name: &'static str,
    /// Scheduler slot, also the dispatch rank.
    pub slot: usize,
    /// Run every `periodicity` macro ticks.
    pub periodicity: u32,
    /// LED handled by the task, see [`pin_id`].
    pub led: u32,
}

/// Default apps compiled into the firmware.
pub const K_DEFAULT_APPS: [AppConfig; 3] = [
    AppConfig {
        name: "red_led",
        slot: 0,
        periodicity: 1,
        led: pin_id(K_PORT_A, 1),
    },
    AppConfig {
        name: "yellow_led",
        slot: 1,
        periodicity: 2,
        led: pin_id(K_PORT_C, 13),
    },
    AppConfig {
        name: "green_led",
        slot: 2,
        periodicity: 5,
        led: pin_id(K_PORT_C, 15),
    },
];

/// Enables the clocks of the LED ports and configures every LED pin as an output.
pub fn init_led_pins<C: RccRegisters, G: GpioRegisters>(
    p_clocks: &mut ClockControl<C>,
    p_gpio: &mut Gpio<G>,
) -> KernelResult<()> {
    p_clocks
        .enable_peripheral_clock(K_APB2, K_IOPA_EN)
        .map_err(KernelError::HalError)?;
    p_clocks
        .enable_peripheral_clock(K_APB2, K_IOPC_EN)
        .map_err(KernelError::HalError)?;

    for l_app in K_DEFAULT_APPS.iter() {
        let (l_port, l_pin) = pin_from_id(l_app.led);
        p_gpio
            .configure_output(l_port, l_pin)
            .map_err(KernelError::HalError)?;
    }
    Ok(())
}

/// Registers every default app in the scheduler, each one calling `p_toggle` with its LED.
///
/// The firmware passes [`led_toggle`](crate::led_toggle); host builds pass their own routine.
pub fn init_kernel_apps<R: SysTickRegisters, const N: usize>(
    p_scheduler: &mut Scheduler<R, N>,
    p_toggle: WorkParam,
) -> KernelResult<()> {
    for l_app in K_DEFAULT_APPS.iter() {
        p_scheduler.register_task(
            l_app.slot,
            l_app.periodicity,
            TaskCall::Param(p_toggle, l_app.led),
        )?;
        info!(
            "App {} registered in slot {}, every {} tick(s)",
            l_app.name, l_app.slot, l_app.periodicity
        );
    }
    Ok(())
}
