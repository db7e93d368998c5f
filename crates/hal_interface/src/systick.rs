//! SysTick register block.
//!
//! The SysTick timer is a 24-bit down counter made of three registers:
//! - the control and status word (`CTRL`),
//! - the reload value (`LOAD`),
//! - the current value (`VAL`).
//!
//! [`SysTickRegisters`] abstracts those three registers so the kernel timer service can be
//! driven either by the real peripheral or by [`crate::SimulatedSysTick`].

/// Counter enable bit of the control word.
pub const K_CTRL_ENABLE: u32 = 1 << 0;

/// SysTick exception request enable bit of the control word.
pub const K_CTRL_TICKINT: u32 = 1 << 1;

/// Clock source selection bit of the control word (set: processor clock, clear: processor clock / 8).
pub const K_CTRL_CLKSOURCE: u32 = 1 << 2;

/// Read-only flag, set when the counter reached zero since the last read of the control word.
pub const K_CTRL_COUNTFLAG: u32 = 1 << 16;

/// Smallest value accepted by the reload register.
pub const K_RELOAD_MIN: u32 = 0x0000_0001;

/// Largest value accepted by the reload register (24 bits).
pub const K_RELOAD_MAX: u32 = 0x00FF_FFFF;

/// Access to the SysTick registers.
///
/// Reads take `&self` because reading has no effect on the timer state except for the
/// count flag, which the hardware clears on read.
pub trait SysTickRegisters {
    /// Reads the control and status word. Clears `COUNTFLAG`.
    fn read_ctrl(&self) -> u32;

    /// Writes the control word. `COUNTFLAG` is read-only and ignored.
    fn write_ctrl(&mut self, p_value: u32);

    /// Reads the reload register.
    fn read_load(&self) -> u32;

    /// Writes the reload register. Only the 24 low bits are kept.
    fn write_load(&mut self, p_value: u32);

    /// Reads the current value register.
    fn read_val(&self) -> u32;

    /// Writes the current value register. Any write clears the counter and `COUNTFLAG`.
    fn write_val(&mut self, p_value: u32);

    /// Called on every iteration of a polling loop waiting for `COUNTFLAG`.
    fn wait_hint(&self) {
        core::hint::spin_loop();
    }
}

#[cfg(feature = "cortex-m")]
impl SysTickRegisters for cortex_m::peripheral::SYST {
    fn read_ctrl(&self) -> u32 {
        self.csr.read()
    }

    fn write_ctrl(&mut self, p_value: u32) {
        // SAFETY: SYST is owned, so no other code writes the control word concurrently.
        unsafe { self.csr.write(p_value & !K_CTRL_COUNTFLAG) }
    }

    fn read_load(&self) -> u32 {
        cortex_m::peripheral::SYST::get_reload()
    }

    fn write_load(&mut self, p_value: u32) {
        self.set_reload(p_value & K_RELOAD_MAX);
    }

    fn read_val(&self) -> u32 {
        cortex_m::peripheral::SYST::get_current()
    }

    fn write_val(&mut self, _p_value: u32) {
        self.clear_current();
    }
}
