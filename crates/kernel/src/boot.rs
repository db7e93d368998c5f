use crate::KernelError::InvalidConfig;
use crate::ident::{K_KERNEL_NAME, K_KERNEL_VERSION};
use crate::scheduler::Scheduler;
use crate::systick::{TimerConfig, TimerService};
use crate::{Hertz, KernelResult, Milliseconds, info};
use hal_interface::SysTickRegisters;
use hal_interface::systick::{K_RELOAD_MAX, K_RELOAD_MIN};

/// Configuration parameters for the kernel boot process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootConfig {
    /// SysTick configuration.
    pub timer: TimerConfig,
    /// Frequency of the processor clock.
    pub core_frequency: Hertz,
    /// Period of the scheduler.
    pub macro_tick: Milliseconds,
}

impl BootConfig {
    /// Checks that the configuration can drive the scheduler.
    ///
    /// # Errors
    /// [`InvalidConfig`] when the core frequency is zero, when the timer interrupt is disabled,
    /// or when the macro tick does not fit in the SysTick reload register.
    pub fn validate(&self) -> KernelResult<()> {
        if self.core_frequency.to_u32() == 0 {
            return Err(InvalidConfig("core frequency is zero"));
        }
        if !self.timer.interrupt_enabled {
            return Err(InvalidConfig("scheduler needs the timer interrupt"));
        }
        self.macro_tick_ticks().map(|_| ())
    }

    /// Number of SysTick ticks in one macro tick.
    ///
    /// # Errors
    /// [`InvalidConfig`] if the result is outside of the reload register range.
    pub fn macro_tick_ticks(&self) -> KernelResult<u32> {
        let l_ticks = self
            .macro_tick
            .to_ticks(self.timer.tick_frequency(self.core_frequency));
        if l_ticks < K_RELOAD_MIN as u64 {
            Err(InvalidConfig("macro tick is shorter than one timer tick"))
        } else if l_ticks > K_RELOAD_MAX as u64 {
            Err(InvalidConfig("macro tick does not fit in the reload register"))
        } else {
            Ok(l_ticks as u32)
        }
    }
}

/// Initializes the kernel.
///
/// This function performs the following steps:
/// 1. Validates the configuration.
/// 2. Logs the boot banner.
/// 3. Initializes the SysTick timer service.
/// 4. Returns a stopped scheduler, ready for task registration.
///
/// The scheduler is started by the caller with [`Scheduler::start`] and
/// [`BootConfig::macro_tick_ticks`] once its tasks are registered.
///
/// # Errors
/// Configuration errors of [`BootConfig::validate`], then timer initialization errors.
pub fn boot<R: SysTickRegisters, const N: usize>(
    p_registers: R,
    p_config: BootConfig,
) -> KernelResult<Scheduler<R, N>> {
    p_config.validate()?;

    info!("Booting {} version {}", K_KERNEL_NAME, K_KERNEL_VERSION);
    info!(
        "Core frequency is {} Hz, timer tick frequency is {} Hz",
        p_config.core_frequency.to_u32(),
        p_config.timer.tick_frequency(p_config.core_frequency).to_u32()
    );
    info!("Macro tick is {} ms", p_config.macro_tick.to_u32());

    let mut l_timer = TimerService::new(p_registers);
    l_timer.initialize(p_config.timer)?;

    info!("Kernel ready, {} task slots", N);
    Ok(Scheduler::new(l_timer))
}
