//! SysTick timer service.
//!
//! [`TimerService`] owns the SysTick register block and offers three ways of waiting:
//! - [`TimerService::busy_wait`]: blocking delay, polling the count flag,
//! - [`TimerService::schedule_once`]: single notification through an [`ExpiryCallback`],
//! - [`TimerService::schedule_periodic`]: notification on every expiry until [`TimerService::stop`].
//!
//! Asynchronous notifications are delivered by [`TimerService::on_interrupt`], which must be
//! called from the SysTick exception handler.

use crate::KernelError::{
    NullCallback, TickRange, TimerAlreadyInitialized, TimerBusy, TimerInterruptDisabled,
    TimerNotInitialized,
};
use crate::{Hertz, KernelResult, debug, trace};
use hal_interface::SysTickRegisters;
use hal_interface::systick::{
    K_CTRL_CLKSOURCE, K_CTRL_COUNTFLAG, K_CTRL_ENABLE, K_CTRL_TICKINT, K_RELOAD_MAX, K_RELOAD_MIN,
};

/// Clock feeding the SysTick counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockSource {
    /// Processor clock.
    Processor,
    /// Processor clock divided by 8.
    ProcessorDiv8,
}

impl ClockSource {
    pub fn divider(&self) -> u32 {
        match self {
            ClockSource::Processor => 1,
            ClockSource::ProcessorDiv8 => 8,
        }
    }
}

/// Timer configuration, applied once by [`TimerService::initialize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerConfig {
    pub clock_source: ClockSource,
    /// When `false`, only [`TimerService::busy_wait`] is available.
    pub interrupt_enabled: bool,
}

impl TimerConfig {
    /// Frequency at which the counter decrements for a given core frequency.
    pub fn tick_frequency(&self, p_core_frequency: Hertz) -> Hertz {
        Hertz(p_core_frequency.to_u32() / self.clock_source.divider())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerMode {
    Idle,
    BusyWait,
    OneShot,
    Periodic,
}

/// Action run when an asynchronous countdown expires.
///
/// Runs in interrupt context: it must be short and must not block.
pub trait ExpiryCallback {
    fn on_expiry(&mut self);
}

impl<F: FnMut()> ExpiryCallback for F {
    fn on_expiry(&mut self) {
        self()
    }
}

/// Owner of the SysTick timer.
///
/// `C` is the type of the callback held for asynchronous scheduling.
pub struct TimerService<R: SysTickRegisters, C: ExpiryCallback> {
    registers: R,
    config: Option<TimerConfig>,
    /// Control word with the counter and interrupt disabled, clock source applied.
    base_ctrl: u32,
    mode: TimerMode,
    callback: Option<C>,
}

impl<R: SysTickRegisters, C: ExpiryCallback> TimerService<R, C> {
    pub fn new(p_registers: R) -> Self {
        TimerService {
            registers: p_registers,
            config: None,
            base_ctrl: 0,
            mode: TimerMode::Idle,
            callback: None,
        }
    }

    /// One-time setup of the timer.
    ///
    /// Clears the control word, selects the clock source and resets the reload and current
    /// value registers. The counter is left disabled.
    ///
    /// # Errors
    /// [`TimerAlreadyInitialized`] if called a second time; the first configuration is kept.
    pub fn initialize(&mut self, p_config: TimerConfig) -> KernelResult<()> {
        if self.config.is_some() {
            return Err(TimerAlreadyInitialized);
        }

        self.registers.write_ctrl(0);
        self.base_ctrl = match p_config.clock_source {
            ClockSource::Processor => K_CTRL_CLKSOURCE,
            ClockSource::ProcessorDiv8 => 0,
        };
        self.registers.write_ctrl(self.base_ctrl);
        self.registers.write_load(0);
        self.registers.write_val(0);

        self.config = Some(p_config);
        self.mode = TimerMode::Idle;
        debug!(
            "SysTick initialized, clock divider {}, interrupt enabled {}",
            p_config.clock_source.divider(),
            p_config.interrupt_enabled
        );
        Ok(())
    }

    /// Blocks for `p_ticks` timer ticks.
    ///
    /// The counter runs without interrupt and the control word is polled until the count flag
    /// rises. The counter is disabled and cleared before returning.
    ///
    /// # Errors
    /// - [`TimerNotInitialized`] before [`TimerService::initialize`].
    /// - [`TickRange`] if `p_ticks` is outside of `[1, 0xFFFFFF]`.
    /// - [`TimerBusy`] while a one-shot or periodic countdown is armed.
    pub fn busy_wait(&mut self, p_ticks: u32) -> KernelResult<()> {
        self.check_initialized()?;
        Self::check_ticks(p_ticks)?;
        if matches!(self.mode, TimerMode::OneShot | TimerMode::Periodic) {
            return Err(TimerBusy);
        }

        self.mode = TimerMode::BusyWait;
        self.registers.write_ctrl(self.base_ctrl);
        self.registers.write_load(p_ticks);
        self.registers.write_val(0);
        self.registers.write_ctrl(self.base_ctrl | K_CTRL_ENABLE);

        while self.registers.read_ctrl() & K_CTRL_COUNTFLAG == 0 {
            self.registers.wait_hint();
        }

        self.disarm();
        Ok(())
    }

    /// Checks that an asynchronous countdown of `p_ticks` can be armed.
    ///
    /// This is the validation performed by [`TimerService::schedule_once`] and
    /// [`TimerService::schedule_periodic`] before any state change, minus the callback check.
    pub fn validate_schedule(&self, p_ticks: u32) -> KernelResult<()> {
        let l_config = self.check_initialized()?;
        Self::check_ticks(p_ticks)?;
        if !l_config.interrupt_enabled {
            return Err(TimerInterruptDisabled);
        }
        Ok(())
    }

    /// Arms a single countdown of `p_ticks` ticks.
    ///
    /// On expiry the counter and its interrupt are disabled, then the callback is invoked once.
    /// An armed countdown is replaced.
    ///
    /// # Errors
    /// Errors of [`TimerService::validate_schedule`], then [`NullCallback`] if `p_callback` is
    /// `None`. Timer state is unchanged on error.
    pub fn schedule_once(&mut self, p_ticks: u32, p_callback: Option<C>) -> KernelResult<()> {
        self.validate_schedule(p_ticks)?;
        let l_callback = p_callback.ok_or(NullCallback)?;

        self.callback = Some(l_callback);
        self.arm(p_ticks, TimerMode::OneShot);
        Ok(())
    }

    /// Arms a countdown reloading to `p_ticks` on every expiry.
    ///
    /// The callback is invoked on every expiry until [`TimerService::stop`].
    ///
    /// # Errors
    /// Same as [`TimerService::schedule_once`].
    pub fn schedule_periodic(&mut self, p_ticks: u32, p_callback: Option<C>) -> KernelResult<()> {
        self.validate_schedule(p_ticks)?;
        let l_callback = p_callback.ok_or(NullCallback)?;

        self.callback = Some(l_callback);
        self.arm(p_ticks, TimerMode::Periodic);
        Ok(())
    }

    /// Disables the counter and its interrupt and clears the reload and current values.
    ///
    /// Calling it on a stopped timer has no further effect. The callback is kept and can be
    /// taken back with [`TimerService::release_callback`].
    pub fn stop(&mut self) -> KernelResult<()> {
        self.check_initialized()?;
        self.disarm();
        Ok(())
    }

    /// Ticks elapsed since the current countdown period started.
    ///
    /// Only meaningful while a countdown is armed.
    pub fn elapsed_ticks(&self) -> KernelResult<u32> {
        self.check_initialized()?;
        Ok(self
            .registers
            .read_load()
            .wrapping_sub(self.registers.read_val()))
    }

    /// Ticks left before the current countdown period expires.
    ///
    /// Only meaningful while a countdown is armed.
    pub fn remaining_ticks(&self) -> KernelResult<u32> {
        self.check_initialized()?;
        Ok(self.registers.read_val())
    }

    /// Expiry protocol, to be called from the SysTick exception handler.
    pub fn on_interrupt(&mut self) {
        match self.mode {
            TimerMode::OneShot => {
                self.disarm();
                if let Some(l_callback) = self.callback.as_mut() {
                    l_callback.on_expiry();
                }
            }
            TimerMode::Periodic => {
                if let Some(l_callback) = self.callback.as_mut() {
                    l_callback.on_expiry();
                }
            }
            TimerMode::Idle | TimerMode::BusyWait => {
                debug!("Spurious SysTick interrupt ignored");
            }
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn config(&self) -> Option<TimerConfig> {
        self.config
    }

    /// Value of the reload register.
    pub fn reload_ticks(&self) -> u32 {
        self.registers.read_load()
    }

    pub fn registers(&self) -> &R {
        &self.registers
    }

    pub fn callback(&self) -> Option<&C> {
        self.callback.as_ref()
    }

    pub fn callback_mut(&mut self) -> Option<&mut C> {
        self.callback.as_mut()
    }

    /// Takes the held callback back. Only allowed while no asynchronous countdown is armed.
    pub fn release_callback(&mut self) -> Option<C> {
        if matches!(self.mode, TimerMode::OneShot | TimerMode::Periodic) {
            return None;
        }
        self.callback.take()
    }

    fn check_initialized(&self) -> KernelResult<TimerConfig> {
        self.config.ok_or(TimerNotInitialized)
    }

    fn check_ticks(p_ticks: u32) -> KernelResult<()> {
        if (K_RELOAD_MIN..=K_RELOAD_MAX).contains(&p_ticks) {
            Ok(())
        } else {
            Err(TickRange(p_ticks))
        }
    }

    fn arm(&mut self, p_ticks: u32, p_mode: TimerMode) {
        self.registers.write_ctrl(self.base_ctrl);
        self.registers.write_load(p_ticks);
        self.registers.write_val(0);
        self.mode = p_mode;
        self.registers
            .write_ctrl(self.base_ctrl | K_CTRL_TICKINT | K_CTRL_ENABLE);
        trace!("SysTick armed for {} ticks", p_ticks);
    }

    fn disarm(&mut self) {
        self.registers.write_ctrl(self.base_ctrl);
        self.registers.write_load(0);
        self.registers.write_val(0);
        self.mode = TimerMode::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KernelError;
    use hal_interface::SimulatedSysTick;

    #[derive(Default)]
    struct Counter {
        hits: u32,
    }

    impl ExpiryCallback for Counter {
        fn on_expiry(&mut self) {
            self.hits += 1;
        }
    }

    const K_ASYNC: TimerConfig = TimerConfig {
        clock_source: ClockSource::Processor,
        interrupt_enabled: true,
    };

    fn timer(p_config: TimerConfig) -> TimerService<SimulatedSysTick, Counter> {
        let mut l_timer = TimerService::new(SimulatedSysTick::new());
        l_timer.initialize(p_config).unwrap();
        l_timer
    }

    /// Runs the simulated counter tick by tick, delivering latched interrupts.
    fn run(p_timer: &mut TimerService<SimulatedSysTick, Counter>, p_ticks: u32) {
        for _ in 0..p_ticks {
            p_timer.registers().advance(1);
            if p_timer.registers().take_pending() {
                p_timer.on_interrupt();
            }
        }
    }

    fn hits(p_timer: &TimerService<SimulatedSysTick, Counter>) -> u32 {
        p_timer.callback().map_or(0, |l_c| l_c.hits)
    }

    #[test]
    fn operations_require_initialization() {
        let mut l_timer: TimerService<SimulatedSysTick, Counter> =
            TimerService::new(SimulatedSysTick::new());
        assert_eq!(l_timer.busy_wait(10), Err(TimerNotInitialized));
        assert_eq!(
            l_timer.schedule_once(10, Some(Counter::default())),
            Err(TimerNotInitialized)
        );
        assert_eq!(l_timer.stop(), Err(TimerNotInitialized));
        assert_eq!(l_timer.elapsed_ticks(), Err(TimerNotInitialized));
        assert!(l_timer.callback().is_none());
    }

    #[test]
    fn second_initialization_is_rejected() {
        let mut l_timer = timer(K_ASYNC);
        let l_other = TimerConfig {
            clock_source: ClockSource::ProcessorDiv8,
            interrupt_enabled: false,
        };
        assert_eq!(l_timer.initialize(l_other), Err(TimerAlreadyInitialized));
        assert_eq!(l_timer.config(), Some(K_ASYNC));
    }

    #[test]
    fn initialization_selects_the_clock_source() {
        let l_timer = timer(K_ASYNC);
        assert_eq!(l_timer.registers().control(), K_CTRL_CLKSOURCE);

        let l_timer = timer(TimerConfig {
            clock_source: ClockSource::ProcessorDiv8,
            interrupt_enabled: true,
        });
        assert_eq!(l_timer.registers().control(), 0);
    }

    #[test]
    fn busy_wait_blocks_for_the_requested_ticks() {
        let mut l_timer = timer(K_ASYNC);
        l_timer.busy_wait(250).unwrap();

        assert_eq!(l_timer.registers().total_ticks(), 250);
        assert_eq!(l_timer.mode(), TimerMode::Idle);
        assert_eq!(l_timer.registers().control(), K_CTRL_CLKSOURCE);
        assert_eq!(l_timer.reload_ticks(), 0);
        assert!(!l_timer.registers().take_pending());
    }

    #[test]
    fn busy_wait_works_without_interrupts() {
        let mut l_timer = timer(TimerConfig {
            clock_source: ClockSource::ProcessorDiv8,
            interrupt_enabled: false,
        });
        l_timer.busy_wait(1).unwrap();
        assert_eq!(l_timer.registers().total_ticks(), 1);
    }

    #[test]
    fn busy_wait_is_refused_while_a_countdown_is_armed() {
        let mut l_timer = timer(K_ASYNC);
        l_timer.schedule_periodic(100, Some(Counter::default())).unwrap();
        assert_eq!(l_timer.busy_wait(10), Err(TimerBusy));
        assert_eq!(l_timer.mode(), TimerMode::Periodic);
    }

    #[test]
    fn tick_bounds_are_enforced() {
        let mut l_timer = timer(K_ASYNC);
        for l_bad in [0, K_RELOAD_MAX + 1, u32::MAX] {
            assert_eq!(l_timer.busy_wait(l_bad), Err(TickRange(l_bad)));
            assert_eq!(
                l_timer.schedule_once(l_bad, Some(Counter::default())),
                Err(TickRange(l_bad))
            );
            assert_eq!(
                l_timer.schedule_periodic(l_bad, Some(Counter::default())),
                Err(TickRange(l_bad))
            );
        }
        assert_eq!(l_timer.mode(), TimerMode::Idle);

        l_timer.schedule_once(K_RELOAD_MAX, Some(Counter::default())).unwrap();
        assert_eq!(l_timer.reload_ticks(), K_RELOAD_MAX);
        l_timer.schedule_periodic(K_RELOAD_MIN, Some(Counter::default())).unwrap();
        assert_eq!(l_timer.reload_ticks(), K_RELOAD_MIN);
    }

    #[test]
    fn one_shot_fires_once_and_disables_the_timer() {
        let mut l_timer = timer(K_ASYNC);
        l_timer.schedule_once(40, Some(Counter::default())).unwrap();

        run(&mut l_timer, 39);
        assert_eq!(hits(&l_timer), 0);
        run(&mut l_timer, 1);
        assert_eq!(hits(&l_timer), 1);
        assert_eq!(l_timer.mode(), TimerMode::Idle);
        assert_eq!(l_timer.registers().control() & (K_CTRL_ENABLE | K_CTRL_TICKINT), 0);

        run(&mut l_timer, 200);
        assert_eq!(hits(&l_timer), 1);
    }

    #[test]
    fn periodic_fires_every_period_until_stopped() {
        let mut l_timer = timer(K_ASYNC);
        l_timer.schedule_periodic(25, Some(Counter::default())).unwrap();

        run(&mut l_timer, 24);
        assert_eq!(hits(&l_timer), 0);
        run(&mut l_timer, 1);
        assert_eq!(hits(&l_timer), 1);
        run(&mut l_timer, 75);
        assert_eq!(hits(&l_timer), 4);

        l_timer.stop().unwrap();
        run(&mut l_timer, 100);
        assert_eq!(hits(&l_timer), 4);
    }

    #[test]
    fn closures_are_callbacks() {
        let l_fired = core::cell::Cell::new(0);
        let mut l_timer = TimerService::new(SimulatedSysTick::new());
        l_timer.initialize(K_ASYNC).unwrap();
        l_timer
            .schedule_once(3, Some(|| l_fired.set(l_fired.get() + 1)))
            .unwrap();

        l_timer.registers().advance(3);
        assert!(l_timer.registers().take_pending());
        l_timer.on_interrupt();
        assert_eq!(l_fired.get(), 1);
    }

    #[test]
    fn missing_callback_leaves_the_armed_countdown_untouched() {
        let mut l_timer = timer(K_ASYNC);
        l_timer.schedule_periodic(50, Some(Counter::default())).unwrap();
        run(&mut l_timer, 60);

        let l_remaining = l_timer.remaining_ticks().unwrap();
        assert_eq!(l_timer.schedule_once(10, None), Err(NullCallback));
        assert_eq!(l_timer.schedule_periodic(10, None), Err(NullCallback));

        assert_eq!(l_timer.mode(), TimerMode::Periodic);
        assert_eq!(l_timer.reload_ticks(), 50);
        assert_eq!(l_timer.remaining_ticks().unwrap(), l_remaining);
        assert_eq!(hits(&l_timer), 1);
    }

    #[test]
    fn range_is_checked_before_the_callback() {
        let mut l_timer = timer(K_ASYNC);
        assert_eq!(l_timer.schedule_once(0, None), Err(TickRange(0)));
    }

    #[test]
    fn asynchronous_scheduling_needs_interrupts() {
        let mut l_timer = timer(TimerConfig {
            clock_source: ClockSource::Processor,
            interrupt_enabled: false,
        });
        assert_eq!(
            l_timer.schedule_periodic(10, Some(Counter::default())),
            Err(KernelError::TimerInterruptDisabled)
        );
        assert_eq!(l_timer.validate_schedule(10), Err(TimerInterruptDisabled));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut l_timer = timer(K_ASYNC);
        l_timer.schedule_periodic(30, Some(Counter::default())).unwrap();
        run(&mut l_timer, 45);

        l_timer.stop().unwrap();
        let l_once = (
            l_timer.mode(),
            l_timer.registers().control(),
            l_timer.reload_ticks(),
            l_timer.remaining_ticks().unwrap(),
            hits(&l_timer),
        );
        l_timer.stop().unwrap();
        let l_twice = (
            l_timer.mode(),
            l_timer.registers().control(),
            l_timer.reload_ticks(),
            l_timer.remaining_ticks().unwrap(),
            hits(&l_timer),
        );
        assert_eq!(l_once, l_twice);
        assert_eq!(l_once.0, TimerMode::Idle);
    }

    #[test]
    fn elapsed_and_remaining_add_up_to_the_reload() {
        let mut l_timer = timer(K_ASYNC);
        l_timer.schedule_periodic(1000, Some(Counter::default())).unwrap();

        for l_step in [0, 1, 17, 400, 581, 999, 1, 1500] {
            run(&mut l_timer, l_step);
            let l_elapsed = l_timer.elapsed_ticks().unwrap();
            let l_remaining = l_timer.remaining_ticks().unwrap();
            assert_eq!(l_elapsed + l_remaining, 1000);
        }
    }

    #[test]
    fn one_shot_counts_down_then_reads_zero() {
        let mut l_timer = timer(K_ASYNC);
        l_timer.schedule_once(200, Some(Counter::default())).unwrap();

        // cumulative 0, 1, 51, 199
        for l_step in [0, 1, 50, 148] {
            run(&mut l_timer, l_step);
            let l_elapsed = l_timer.elapsed_ticks().unwrap();
            let l_remaining = l_timer.remaining_ticks().unwrap();
            assert_eq!(l_elapsed + l_remaining, 200);
            assert_eq!(hits(&l_timer), 0);
        }
        assert_eq!(l_timer.remaining_ticks(), Ok(1));

        run(&mut l_timer, 1);
        assert_eq!(hits(&l_timer), 1);
        assert_eq!(l_timer.mode(), TimerMode::Idle);
        assert_eq!(l_timer.elapsed_ticks(), Ok(0));
        assert_eq!(l_timer.remaining_ticks(), Ok(0));
    }

    #[test]
    fn spurious_interrupts_are_ignored() {
        let mut l_timer = timer(K_ASYNC);
        l_timer.on_interrupt();
        l_timer.schedule_once(5, Some(Counter::default())).unwrap();
        run(&mut l_timer, 5);
        l_timer.on_interrupt();
        assert_eq!(hits(&l_timer), 1);
    }

    #[test]
    fn callback_is_released_only_when_idle() {
        let mut l_timer = timer(K_ASYNC);
        l_timer.schedule_periodic(5, Some(Counter::default())).unwrap();
        run(&mut l_timer, 10);
        assert!(l_timer.release_callback().is_none());

        l_timer.stop().unwrap();
        let l_counter = l_timer.release_callback().unwrap();
        assert_eq!(l_counter.hits, 2);
        assert!(l_timer.callback().is_none());
    }

    #[test]
    fn tick_frequency_follows_the_divider() {
        let l_config = TimerConfig {
            clock_source: ClockSource::ProcessorDiv8,
            interrupt_enabled: true,
        };
        assert_eq!(l_config.tick_frequency(Hertz(8_000_000)), Hertz(1_000_000));
        assert_eq!(K_ASYNC.tick_frequency(Hertz(72_000_000)), Hertz(72_000_000));
    }
}
