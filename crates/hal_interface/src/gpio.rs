//! Minimal GPIO output driver: push-pull configuration and pin toggling.

use crate::{HalError, HalResult};

/// Number of ports (A to G).
pub const K_PORT_COUNT: u8 = 7;

/// Number of pins per port.
pub const K_PIN_COUNT: u8 = 16;

/// Output push-pull, 2 MHz (MODE = 0b10, CNF = 0b00).
const K_OUTPUT_PUSH_PULL: u32 = 0b0010;

/// GPIO register selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GpioRegister {
    /// Configuration register for pins 0 to 7.
    ConfigLow,
    /// Configuration register for pins 8 to 15.
    ConfigHigh,
    /// Output data register.
    OutputData,
}

/// Access to the registers of every GPIO port.
pub trait GpioRegisters {
    fn read(&self, p_port: u8, p_register: GpioRegister) -> u32;
    fn write(&mut self, p_port: u8, p_register: GpioRegister, p_value: u32);
}

/// GPIO ports of the STM32F103, reached through the `stm32f1` register crate.
///
/// Holds no peripheral: the task bodies toggling LEDs build one on every call, from interrupt
/// context. Port registers are only ever touched through [`Gpio`].
#[cfg(feature = "cortex-m")]
#[derive(Debug, Default)]
pub struct MmioGpio;

#[cfg(feature = "cortex-m")]
impl MmioGpio {
    fn port(p_port: u8) -> &'static stm32f1::stm32f103::gpioa::RegisterBlock {
        use stm32f1::stm32f103::{GPIOA, GPIOB, GPIOC, GPIOD, GPIOE, GPIOF, GPIOG};

        let l_block = match p_port {
            0 => GPIOA::ptr(),
            1 => GPIOB::ptr(),
            2 => GPIOC::ptr(),
            3 => GPIOD::ptr(),
            4 => GPIOE::ptr(),
            5 => GPIOF::ptr(),
            _ => GPIOG::ptr(),
        };
        // SAFETY: the register crate gives the fixed address of a memory-mapped block that
        // lives for the whole program.
        unsafe { &*l_block }
    }
}

#[cfg(feature = "cortex-m")]
impl GpioRegisters for MmioGpio {
    fn read(&self, p_port: u8, p_register: GpioRegister) -> u32 {
        let l_port = Self::port(p_port);
        match p_register {
            GpioRegister::ConfigLow => l_port.crl().read().bits(),
            GpioRegister::ConfigHigh => l_port.crh().read().bits(),
            GpioRegister::OutputData => l_port.odr().read().bits(),
        }
    }

    fn write(&mut self, p_port: u8, p_register: GpioRegister, p_value: u32) {
        let l_port = Self::port(p_port);
        // SAFETY: `Gpio` only changes the nibble or bit of the pin it drives.
        match p_register {
            GpioRegister::ConfigLow => l_port.crl().write(|w| unsafe { w.bits(p_value) }),
            GpioRegister::ConfigHigh => l_port.crh().write(|w| unsafe { w.bits(p_value) }),
            GpioRegister::OutputData => l_port.odr().write(|w| unsafe { w.bits(p_value) }),
        };
    }
}

/// GPIO output driver.
pub struct Gpio<R: GpioRegisters> {
    registers: R,
}

impl<R: GpioRegisters> Gpio<R> {
    pub fn new(p_registers: R) -> Self {
        Gpio {
            registers: p_registers,
        }
    }

    /// Configures a pin as a push-pull output.
    ///
    /// The port clock must be enabled beforehand.
    ///
    /// # Errors
    /// [`HalError::InvalidPortId`] or [`HalError::InvalidPinId`] for out-of-range identifiers.
    pub fn configure_output(&mut self, p_port: u8, p_pin: u8) -> HalResult<()> {
        Self::check(p_port, p_pin)?;

        let l_register = if p_pin < 8 {
            GpioRegister::ConfigLow
        } else {
            GpioRegister::ConfigHigh
        };
        let l_shift = (p_pin % 8) as u32 * 4;
        let l_value = self.registers.read(p_port, l_register) & !(0xF << l_shift);
        self.registers
            .write(p_port, l_register, l_value | (K_OUTPUT_PUSH_PULL << l_shift));
        Ok(())
    }

    /// Inverts the output level of a pin.
    ///
    /// # Errors
    /// [`HalError::InvalidPortId`] or [`HalError::InvalidPinId`] for out-of-range identifiers.
    pub fn toggle(&mut self, p_port: u8, p_pin: u8) -> HalResult<()> {
        Self::check(p_port, p_pin)?;
        let l_odr = self.registers.read(p_port, GpioRegister::OutputData);
        self.registers
            .write(p_port, GpioRegister::OutputData, l_odr ^ (1 << p_pin));
        Ok(())
    }

    pub fn registers(&self) -> &R {
        &self.registers
    }

    fn check(p_port: u8, p_pin: u8) -> HalResult<()> {
        if p_port >= K_PORT_COUNT {
            Err(HalError::InvalidPortId(p_port))
        } else if p_pin >= K_PIN_COUNT {
            Err(HalError::InvalidPinId(p_pin))
        } else {
            Ok(())
        }
    }
}
