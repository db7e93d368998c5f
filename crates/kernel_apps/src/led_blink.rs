//! LED toggling task.
//!
//! The task parameter identifies the LED pin: port number in bits 8 to 15, pin number in bits
//! 0 to 7 (see [`pin_id`]).

use hal_interface::{Gpio, GpioRegisters};
use kernel::{KernelError, KernelResult};

/// Builds the task parameter of the LED on `p_port`/`p_pin`.
pub const fn pin_id(p_port: u8, p_pin: u8) -> u32 {
    ((p_port as u32) << 8) | p_pin as u32
}

/// Splits a task parameter into port and pin numbers.
pub const fn pin_from_id(p_id: u32) -> (u8, u8) {
    ((p_id >> 8) as u8, p_id as u8)
}

/// Toggles the LED identified by `p_id` through the given GPIO driver.
pub fn toggle_led<R: GpioRegisters>(p_gpio: &mut Gpio<R>, p_id: u32) -> KernelResult<()> {
    let (l_port, l_pin) = pin_from_id(p_id);
    p_gpio.toggle(l_port, l_pin).map_err(KernelError::HalError)
}

/// Task body: toggles the LED identified by `p_id` on the hardware GPIO ports.
#[cfg(feature = "cortex-m")]
pub fn led_toggle(p_id: u32) -> KernelResult<()> {
    toggle_led(&mut Gpio::new(hal_interface::MmioGpio), p_id)
}
