//! Peripheral clock control.
//!
//! Only the per-bus clock enable registers are driven here: the clock tree itself
//! (oscillators, PLL, prescalers) is left as configured by the reset state or the bootloader.

use crate::{HalError, HalResult};

/// Highest bit position of a bus enable register.
const K_MAX_PERIPHERAL_ID: u8 = 31;

/// Bus identifiers, numbered as accepted by [`ClockControl::enable_peripheral_clock`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bus {
    /// Advanced high-performance bus.
    Ahb = 0,
    /// Advanced peripheral bus 1.
    Apb1 = 1,
    /// Advanced peripheral bus 2.
    Apb2 = 2,
}

impl TryFrom<u8> for Bus {
    type Error = HalError;

    fn try_from(p_id: u8) -> HalResult<Self> {
        match p_id {
            0 => Ok(Bus::Ahb),
            1 => Ok(Bus::Apb1),
            2 => Ok(Bus::Apb2),
            _ => Err(HalError::InvalidBusId(p_id)),
        }
    }
}

/// Access to the clock enable register of each bus.
pub trait RccRegisters {
    fn read_enable(&self, p_bus: Bus) -> u32;
    fn write_enable(&mut self, p_bus: Bus, p_value: u32);
}

/// RCC registers of the STM32F103, reached through the `stm32f1` register crate.
#[cfg(feature = "cortex-m")]
pub struct MmioRcc {
    rcc: stm32f1::stm32f103::RCC,
}

#[cfg(feature = "cortex-m")]
impl MmioRcc {
    pub fn new(p_rcc: stm32f1::stm32f103::RCC) -> Self {
        MmioRcc { rcc: p_rcc }
    }
}

#[cfg(feature = "cortex-m")]
impl RccRegisters for MmioRcc {
    fn read_enable(&self, p_bus: Bus) -> u32 {
        match p_bus {
            Bus::Ahb => self.rcc.ahbenr().read().bits(),
            Bus::Apb1 => self.rcc.apb1enr().read().bits(),
            Bus::Apb2 => self.rcc.apb2enr().read().bits(),
        }
    }

    fn write_enable(&mut self, p_bus: Bus, p_value: u32) {
        // SAFETY: every bit of the enable registers is either a clock enable or reserved
        // and read back unchanged by `ClockControl`.
        match p_bus {
            Bus::Ahb => self.rcc.ahbenr().write(|w| unsafe { w.bits(p_value) }),
            Bus::Apb1 => self.rcc.apb1enr().write(|w| unsafe { w.bits(p_value) }),
            Bus::Apb2 => self.rcc.apb2enr().write(|w| unsafe { w.bits(p_value) }),
        };
    }
}

/// Enables and disables peripheral clocks on the AHB, APB1 and APB2 buses.
pub struct ClockControl<R: RccRegisters> {
    registers: R,
}

impl<R: RccRegisters> ClockControl<R> {
    pub fn new(p_registers: R) -> Self {
        ClockControl {
            registers: p_registers,
        }
    }

    /// Enables the clock of a peripheral.
    ///
    /// # Parameters
    /// - `p_bus_id`: bus the peripheral is connected to (0 = AHB, 1 = APB1, 2 = APB2).
    /// - `p_peripheral_id`: bit position of the peripheral in the bus enable register (0..=31).
    ///
    /// # Errors
    /// - [`HalError::InvalidBusId`] if the bus does not exist.
    /// - [`HalError::InvalidPeripheralId`] if the peripheral ID is above 31.
    ///
    /// Registers are left untouched when an error is returned.
    pub fn enable_peripheral_clock(&mut self, p_bus_id: u8, p_peripheral_id: u8) -> HalResult<()> {
        let (l_bus, l_mask) = Self::decode(p_bus_id, p_peripheral_id)?;
        let l_value = self.registers.read_enable(l_bus);
        self.registers.write_enable(l_bus, l_value | l_mask);
        Ok(())
    }

    /// Disables the clock of a peripheral.
    ///
    /// Same parameters and errors as [`ClockControl::enable_peripheral_clock`].
    pub fn disable_peripheral_clock(&mut self, p_bus_id: u8, p_peripheral_id: u8) -> HalResult<()> {
        let (l_bus, l_mask) = Self::decode(p_bus_id, p_peripheral_id)?;
        let l_value = self.registers.read_enable(l_bus);
        self.registers.write_enable(l_bus, l_value & !l_mask);
        Ok(())
    }

    pub fn registers(&self) -> &R {
        &self.registers
    }

    fn decode(p_bus_id: u8, p_peripheral_id: u8) -> HalResult<(Bus, u32)> {
        let l_bus = Bus::try_from(p_bus_id)?;
        if p_peripheral_id > K_MAX_PERIPHERAL_ID {
            return Err(HalError::InvalidPeripheralId(p_peripheral_id));
        }
        Ok((l_bus, 1 << p_peripheral_id))
    }
}
