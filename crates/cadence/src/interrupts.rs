use crate::G_SCHEDULER;
use cortex_m::interrupt;
use cortex_m_rt::{ExceptionFrame, exception};
use cortex_m_semihosting::hprintln;

/// SysTick exception: runs the scheduler expiry protocol.
#[exception]
fn SysTick() {
    interrupt::free(|cs| {
        if let Some(l_scheduler) = G_SCHEDULER.borrow(cs).borrow_mut().as_mut() {
            l_scheduler.on_interrupt();
        }
    });
}

/// Prints the exception frame over semihosting and halts.
#[exception]
unsafe fn HardFault(ef: &ExceptionFrame) -> ! {
    hprintln!("{:#?}", ef);

    #[allow(clippy::empty_loop)]
    loop {}
}
