use crate::KernelError::{
    HalError, InvalidConfig, InvalidPeriodicity, NullCallback, SchedulerAlreadyStarted,
    SlotAlreadyUsed, SlotOutOfRange, TaskError, TickRange, TimerAlreadyInitialized, TimerBusy,
    TimerInterruptDisabled, TimerNotInitialized,
};
use crate::KernelErrorLevel::{Critical, Error, Fatal};
use hal_interface::{HalError as HalErrorDef, HalErrorLevel};
use heapless::{String, format};

pub type KernelResult<T> = Result<T, KernelError>;

#[derive(Debug, Clone, Copy, PartialOrd, PartialEq)]
pub enum KernelErrorLevel {
    Error,
    Critical,
    Fatal,
}

impl KernelErrorLevel {
    pub fn as_str(&self) -> &str {
        match self {
            Fatal => "Fatal error : ",
            Critical => "Critical error : ",
            Error => "Error : ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelError {
    HalError(HalErrorDef),
    /// Tick count outside of the 24-bit reload range.
    TickRange(u32),
    /// Asynchronous scheduling requested without a callback.
    NullCallback,
    TimerNotInitialized,
    TimerAlreadyInitialized,
    /// A one-shot or periodic countdown is armed.
    TimerBusy,
    /// Asynchronous scheduling requested while the timer interrupt is disabled by configuration.
    TimerInterruptDisabled,
    SlotOutOfRange(usize),
    SlotAlreadyUsed(usize),
    InvalidPeriodicity(usize),
    SchedulerAlreadyStarted,
    InvalidConfig(&'static str),
    /// Failure reported by a task body, with the severity chosen by the task.
    TaskError(KernelErrorLevel, &'static str),
}

impl KernelError {
    pub fn to_string(&self) -> String<256> {
        let mut l_msg = String::new();
        if let HalError(l_e) = self {
            l_msg.push_str(l_e.to_string().as_str()).unwrap();
            return l_msg;
        }

        l_msg.push_str(self.severity().as_str()).unwrap();
        let l_body: String<200> = match self {
            HalError(_) => String::new(),
            TickRange(l_ticks) => {
                format!(200; "Tick count {} is outside of [1, 16777215]", l_ticks).unwrap()
            }
            NullCallback => format!(200; "No callback given for asynchronous scheduling").unwrap(),
            TimerNotInitialized => format!(200; "Timer is not initialized").unwrap(),
            TimerAlreadyInitialized => format!(200; "Timer is already initialized").unwrap(),
            TimerBusy => format!(200; "Timer is busy with an armed countdown").unwrap(),
            TimerInterruptDisabled => {
                format!(200; "Timer interrupt is disabled by configuration").unwrap()
            }
            SlotOutOfRange(l_slot) => {
                format!(200; "Task slot {} does not exist", l_slot).unwrap()
            }
            SlotAlreadyUsed(l_slot) => {
                format!(200; "Task slot {} is already used", l_slot).unwrap()
            }
            InvalidPeriodicity(l_slot) => {
                format!(200; "Task in slot {} has a null periodicity", l_slot).unwrap()
            }
            SchedulerAlreadyStarted => format!(200; "Scheduler is already started").unwrap(),
            InvalidConfig(l_reason) => {
                format!(200; "Invalid configuration : {}", l_reason).unwrap()
            }
            TaskError(_, l_reason) => format!(200; "Task error : {}", l_reason).unwrap(),
        };
        l_msg.push_str(l_body.as_str()).unwrap();
        l_msg
    }

    /// Returns the severity level of the kernel error.
    ///
    /// HAL errors keep the severity given by the HAL and task errors the one chosen by the
    /// task. Configuration and timer ownership problems are critical; everything a caller can
    /// fix by retrying with other arguments is a plain error.
    pub fn severity(&self) -> KernelErrorLevel {
        match self {
            HalError(l_err) => match l_err.severity() {
                HalErrorLevel::Critical => Critical,
                HalErrorLevel::Error => Error,
            },
            TickRange(_) => Error,
            NullCallback => Error,
            TimerNotInitialized => Critical,
            TimerAlreadyInitialized => Error,
            TimerBusy => Error,
            TimerInterruptDisabled => Critical,
            SlotOutOfRange(_) => Error,
            SlotAlreadyUsed(_) => Error,
            InvalidPeriodicity(_) => Error,
            SchedulerAlreadyStarted => Error,
            InvalidConfig(_) => Critical,
            TaskError(l_level, _) => *l_level,
        }
    }
}

impl From<HalErrorDef> for KernelError {
    fn from(p_err: HalErrorDef) -> Self {
        HalError(p_err)
    }
}
