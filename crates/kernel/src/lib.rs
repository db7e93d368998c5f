#![cfg_attr(not(test), no_std)]
// defmt does not accept inlined format arguments
#![allow(clippy::uninlined_format_args)]

//! Time base and cooperative scheduler.
//!
//! The [`TimerService`] owns the SysTick timer; the [`Scheduler`] arms it in periodic mode and
//! runs its registered tasks in slot order on every expiry. [`boot`] ties both together from a
//! validated [`BootConfig`].

#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, error, info, trace, warn};

#[cfg(not(feature = "defmt"))]
pub(crate) use log::{debug, error, info, trace, warn};

mod boot;
mod errors_mgt;
mod ident;
mod scheduler;
mod systick;
mod types;

pub use boot::{BootConfig, boot};
pub use errors_mgt::ErrorsManager;
pub use ident::{K_KERNEL_NAME, K_KERNEL_VERSION};
pub use scheduler::{Scheduler, Task, TaskCall, TaskTable, Work, WorkParam};
pub use systick::{ClockSource, ExpiryCallback, TimerConfig, TimerMode, TimerService};
pub use types::*;
