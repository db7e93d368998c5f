//! Software models of the register blocks.
//!
//! They behave like the peripherals as far as the drivers can observe, so the kernel can be
//! exercised on the host. Time only moves when [`SimulatedSysTick::advance`] is called (or,
//! while a driver polls the count flag, through [`SysTickRegisters::wait_hint`]).

use crate::gpio::{GpioRegister, GpioRegisters, K_PORT_COUNT};
use crate::rcc::{Bus, RccRegisters};
use crate::systick::{
    K_CTRL_COUNTFLAG, K_CTRL_ENABLE, K_CTRL_TICKINT, K_RELOAD_MAX, SysTickRegisters,
};
use core::cell::Cell;

/// Ideal SysTick model.
///
/// A countdown lasts exactly `LOAD` ticks: the counter is loaded when enabled, decremented
/// once per tick and reloaded on the tick it reaches zero. Reaching zero sets the count flag
/// and, when `TICKINT` is set, latches a pending interrupt.
///
/// The hardware counts `LOAD + 1` cycles per period (`busy_wait(1)` lasts 2 cycles on a real
/// SysTick); this model counts exactly `LOAD`.
#[derive(Debug, Default)]
pub struct SimulatedSysTick {
    ctrl: Cell<u32>,
    count_flag: Cell<bool>,
    load: Cell<u32>,
    val: Cell<u32>,
    pending: Cell<bool>,
    total_ticks: Cell<u64>,
}

impl SimulatedSysTick {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the counter for `p_ticks` ticks and returns how many times it reached zero.
    ///
    /// Nothing happens while the counter is disabled or the reload value is zero.
    pub fn advance(&self, p_ticks: u32) -> u32 {
        let mut l_wraps = 0;
        for _ in 0..p_ticks {
            if self.ctrl.get() & K_CTRL_ENABLE == 0 || self.load.get() == 0 {
                break;
            }
            self.total_ticks.set(self.total_ticks.get() + 1);

            if self.val.get() == 0 {
                self.val.set(self.load.get());
            }
            self.val.set(self.val.get() - 1);

            if self.val.get() == 0 {
                l_wraps += 1;
                self.count_flag.set(true);
                if self.ctrl.get() & K_CTRL_TICKINT != 0 {
                    self.pending.set(true);
                }
                self.val.set(self.load.get());
            }
        }
        l_wraps
    }

    /// Returns and clears the pending interrupt latch.
    pub fn take_pending(&self) -> bool {
        self.pending.replace(false)
    }

    /// Control word as last written, without touching the count flag.
    pub fn control(&self) -> u32 {
        self.ctrl.get()
    }

    /// Number of ticks counted since creation.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks.get()
    }
}

impl SysTickRegisters for SimulatedSysTick {
    fn read_ctrl(&self) -> u32 {
        let l_flag = if self.count_flag.replace(false) {
            K_CTRL_COUNTFLAG
        } else {
            0
        };
        self.ctrl.get() | l_flag
    }

    fn write_ctrl(&mut self, p_value: u32) {
        let l_was_enabled = self.ctrl.get() & K_CTRL_ENABLE != 0;
        self.ctrl.set(p_value & !K_CTRL_COUNTFLAG);
        if !l_was_enabled && p_value & K_CTRL_ENABLE != 0 && self.val.get() == 0 {
            self.val.set(self.load.get());
        }
    }

    fn read_load(&self) -> u32 {
        self.load.get()
    }

    fn write_load(&mut self, p_value: u32) {
        self.load.set(p_value & K_RELOAD_MAX);
    }

    fn read_val(&self) -> u32 {
        self.val.get()
    }

    fn write_val(&mut self, _p_value: u32) {
        self.val.set(0);
        self.count_flag.set(false);
    }

    fn wait_hint(&self) {
        self.advance(1);
    }
}

/// RCC model: three enable registers and a write counter.
#[derive(Debug, Default)]
pub struct SimulatedRcc {
    enable: [u32; 3],
    writes: u32,
}

impl SimulatedRcc {
    /// Number of register writes performed so far.
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl RccRegisters for SimulatedRcc {
    fn read_enable(&self, p_bus: Bus) -> u32 {
        self.enable[p_bus as usize]
    }

    fn write_enable(&mut self, p_bus: Bus, p_value: u32) {
        self.enable[p_bus as usize] = p_value;
        self.writes += 1;
    }
}

/// GPIO model: CRL, CRH and ODR of every port, reset to zero.
#[derive(Debug, Default)]
pub struct SimulatedGpio {
    ports: [[u32; 3]; K_PORT_COUNT as usize],
}

impl SimulatedGpio {
    fn index(p_register: GpioRegister) -> usize {
        match p_register {
            GpioRegister::ConfigLow => 0,
            GpioRegister::ConfigHigh => 1,
            GpioRegister::OutputData => 2,
        }
    }
}

impl GpioRegisters for SimulatedGpio {
    fn read(&self, p_port: u8, p_register: GpioRegister) -> u32 {
        self.ports[p_port as usize][Self::index(p_register)]
    }

    fn write(&mut self, p_port: u8, p_register: GpioRegister, p_value: u32) {
        self.ports[p_port as usize][Self::index(p_register)] = p_value;
    }
}
