#![cfg_attr(not(test), no_std)]

//! Register-level hardware abstraction.
//!
//! Each peripheral used by the kernel is reached through a small register trait:
//! - [`SysTickRegisters`] for the core countdown timer,
//! - [`RccRegisters`] for the peripheral clock enable registers,
//! - [`GpioRegisters`] for the GPIO ports.
//!
//! With the `cortex-m` feature, every trait has a hardware implementation: `SYST` from
//! `cortex-m`, `MmioRcc` and `MmioGpio` over the `stm32f1` register crate. The software models
//! of [`sim`] are always available for the host tests.

mod errors;
pub mod gpio;
pub mod rcc;
pub mod sim;
pub mod systick;

pub use errors::{HalError, HalErrorLevel, HalResult};
pub use gpio::{Gpio, GpioRegister, GpioRegisters};
pub use rcc::{Bus, ClockControl, RccRegisters};
pub use sim::{SimulatedGpio, SimulatedRcc, SimulatedSysTick};
pub use systick::SysTickRegisters;

#[cfg(feature = "cortex-m")]
pub use gpio::MmioGpio;
#[cfg(feature = "cortex-m")]
pub use rcc::MmioRcc;
