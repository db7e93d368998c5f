use crate::KernelError::{
    InvalidPeriodicity, SchedulerAlreadyStarted, SlotAlreadyUsed, SlotOutOfRange,
};
use crate::systick::{ExpiryCallback, TimerService};
use crate::{ErrorsManager, KernelResult, debug, info, warn};
use core::num::NonZeroU32;
use hal_interface::SysTickRegisters;

/// Task body taking no parameter.
pub type Work = fn() -> KernelResult<()>;

/// Task body taking a `u32` parameter, so that one function can serve several tasks
/// (e.g. one toggle routine for several LEDs).
pub type WorkParam = fn(u32) -> KernelResult<()>;

/// Represents the different ways a task can be called by the scheduler.
///
/// # Variants
///
/// * `NoParam(Work)` - The function pointer is called directly without arguments.
///
/// * `Param(WorkParam, u32)` - The function pointer is called with the stored `u32` value.
#[derive(Debug, Clone, Copy)]
pub enum TaskCall {
    NoParam(Work),
    Param(WorkParam, u32),
}

impl TaskCall {
    pub fn call(&self) -> KernelResult<()> {
        match self {
            TaskCall::NoParam(l_work) => l_work(),
            TaskCall::Param(l_work, l_param) => l_work(*l_param),
        }
    }
}

/// A registered task.
///
/// # Fields
///
/// * `slot` - Position in the task table. Tasks are dispatched in increasing slot order.
/// * `periodicity` - The task runs on every macro-tick whose number is a multiple of it.
/// * `work` - What to run.
#[derive(Debug, Clone, Copy)]
pub struct Task {
    pub slot: usize,
    pub periodicity: NonZeroU32,
    pub work: TaskCall,
}

/// Fixed-capacity task table and its dispatch routine.
///
/// While the scheduler runs, the table is held by the timer service as its expiry callback.
pub struct TaskTable<const N: usize> {
    slots: [Option<Task>; N],
    tick_counter: u32,
    errors: ErrorsManager,
}

impl<const N: usize> Default for TaskTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TaskTable<N> {
    pub const fn new() -> Self {
        TaskTable {
            slots: [None; N],
            tick_counter: 0,
            errors: ErrorsManager::new(),
        }
    }

    /// Writes a task in `p_slot`.
    ///
    /// # Errors
    /// - [`SlotOutOfRange`] if `p_slot >= N`.
    /// - [`InvalidPeriodicity`] if `p_periodicity` is 0.
    /// - [`SlotAlreadyUsed`] if another task already occupies the slot.
    pub fn register(
        &mut self,
        p_slot: usize,
        p_periodicity: u32,
        p_work: TaskCall,
    ) -> KernelResult<()> {
        let l_entry = self.slots.get_mut(p_slot).ok_or(SlotOutOfRange(p_slot))?;
        let l_periodicity = NonZeroU32::new(p_periodicity).ok_or(InvalidPeriodicity(p_slot))?;
        if l_entry.is_some() {
            return Err(SlotAlreadyUsed(p_slot));
        }

        *l_entry = Some(Task {
            slot: p_slot,
            periodicity: l_periodicity,
            work: p_work,
        });
        Ok(())
    }

    /// Runs one macro-tick.
    ///
    /// The tick counter is incremented (wrapping at 2^32), then every task whose periodicity
    /// divides the counter is executed, in increasing slot order. A failing task is reported to
    /// the [`ErrorsManager`] and does not prevent the next ones from running.
    pub fn dispatch(&mut self) {
        self.tick_counter = self.tick_counter.wrapping_add(1);

        for l_task in self.slots.iter().flatten() {
            if self.tick_counter.is_multiple_of(l_task.periodicity.get()) {
                if let Err(l_err) = l_task.work.call() {
                    self.errors.error_handler(&l_err);
                }
            }
        }
    }

    pub fn tick_count(&self) -> u32 {
        self.tick_counter
    }

    pub fn task_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn task(&self, p_slot: usize) -> Option<&Task> {
        self.slots.get(p_slot).and_then(|l_t| l_t.as_ref())
    }

    pub fn errors(&self) -> &ErrorsManager {
        &self.errors
    }
}

impl<const N: usize> ExpiryCallback for TaskTable<N> {
    fn on_expiry(&mut self) {
        self.dispatch();
    }
}

/// Cooperative scheduler with `N` task slots.
///
/// Tasks are registered before [`Scheduler::start`]. Once started, the task table belongs to the
/// timer service, which runs [`TaskTable::dispatch`] on every expiry; [`Scheduler::stop`] takes
/// it back.
pub struct Scheduler<R: SysTickRegisters, const N: usize> {
    timer: TimerService<R, TaskTable<N>>,
    /// `Some` while stopped, `None` while the timer holds the table.
    table: Option<TaskTable<N>>,
}

impl<R: SysTickRegisters, const N: usize> Scheduler<R, N> {
    /// Creates a stopped scheduler with an empty task table.
    ///
    /// The timer service is expected to be initialized already; [`Scheduler::start`] reports
    /// it otherwise.
    pub fn new(p_timer: TimerService<R, TaskTable<N>>) -> Self {
        Scheduler {
            timer: p_timer,
            table: Some(TaskTable::new()),
        }
    }

    /// Registers a task. Only allowed before [`Scheduler::start`].
    ///
    /// # Errors
    /// [`SchedulerAlreadyStarted`] once started, then the errors of [`TaskTable::register`].
    pub fn register_task(
        &mut self,
        p_slot: usize,
        p_periodicity: u32,
        p_work: TaskCall,
    ) -> KernelResult<()> {
        let l_table = self.table.as_mut().ok_or(SchedulerAlreadyStarted)?;
        match l_table.register(p_slot, p_periodicity, p_work) {
            Ok(()) => {
                debug!("Task registered in slot {} with periodicity {}", p_slot, p_periodicity);
                Ok(())
            }
            Err(l_err) => {
                warn!("Task registration rejected : {}", l_err.to_string().as_str());
                Err(l_err)
            }
        }
    }

    /// Arms the timer in periodic mode, one expiry every `p_macro_tick` ticks, with the task
    /// table as callback.
    ///
    /// # Errors
    /// - [`SchedulerAlreadyStarted`] if already running.
    /// - Errors of [`TimerService::validate_schedule`]. Tasks are kept and the scheduler stays
    ///   registrable.
    pub fn start(&mut self, p_macro_tick: u32) -> KernelResult<()> {
        if self.table.is_none() {
            return Err(SchedulerAlreadyStarted);
        }
        self.timer.validate_schedule(p_macro_tick)?;

        let l_table = self.table.take().ok_or(SchedulerAlreadyStarted)?;
        let l_count = l_table.task_count();
        self.timer.schedule_periodic(p_macro_tick, Some(l_table))?;
        info!(
            "Scheduler started with {} task(s), macro tick of {} ticks",
            l_count, p_macro_tick
        );
        Ok(())
    }

    /// Entry point of the SysTick exception.
    pub fn on_interrupt(&mut self) {
        self.timer.on_interrupt();
    }

    /// Stops the timer and takes the task table back.
    ///
    /// Tasks and tick counter are preserved, so the scheduler can be started again. Stopping a
    /// stopped scheduler does nothing.
    pub fn stop(&mut self) -> KernelResult<()> {
        if self.table.is_some() {
            return Ok(());
        }
        self.timer.stop()?;
        self.table = self.timer.release_callback();
        info!("Scheduler stopped after {} ticks", self.tick_count());
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.table.is_none()
    }

    /// Number of macro-ticks dispatched so far.
    pub fn tick_count(&self) -> u32 {
        self.tasks().map_or(0, |l_t| l_t.tick_count())
    }

    pub fn task_count(&self) -> usize {
        self.tasks().map_or(0, |l_t| l_t.task_count())
    }

    pub fn slot_in_use(&self, p_slot: usize) -> bool {
        self.tasks().is_some_and(|l_t| l_t.task(p_slot).is_some())
    }

    pub fn errors(&self) -> Option<&ErrorsManager> {
        self.tasks().map(|l_t| l_t.errors())
    }

    pub fn timer(&self) -> &TimerService<R, TaskTable<N>> {
        &self.timer
    }

    /// Task table, wherever it currently lives.
    fn tasks(&self) -> Option<&TaskTable<N>> {
        self.table.as_ref().or(self.timer.callback())
    }
}
