mod common;

use common::{K_BOOT_CONFIG, record, run, scheduler, take_fired};
use kernel::KernelError::{
    InvalidPeriodicity, SchedulerAlreadyStarted, SlotAlreadyUsed, SlotOutOfRange, TickRange,
    TimerNotInitialized,
};
use kernel::{KernelError, KernelResult, Scheduler, TaskCall, TimerMode, TimerService};
use hal_interface::SimulatedSysTick;

fn three_leds() -> Scheduler<SimulatedSysTick, 3> {
    let mut l_sched = scheduler::<3>();
    l_sched.register_task(0, 1, TaskCall::Param(record, 0)).unwrap();
    l_sched.register_task(1, 2, TaskCall::Param(record, 1)).unwrap();
    l_sched.register_task(2, 5, TaskCall::Param(record, 2)).unwrap();
    l_sched
}

#[test_log::test]
fn dispatch_follows_periodicities_in_slot_order() {
    let mut l_sched = three_leds();
    let l_macro = K_BOOT_CONFIG.macro_tick_ticks().unwrap();
    l_sched.start(l_macro).unwrap();

    let l_expected: [&[u32]; 10] = [
        &[0],
        &[0, 1],
        &[0],
        &[0, 1],
        &[0, 2],
        &[0, 1],
        &[0],
        &[0, 1],
        &[0],
        &[0, 1, 2],
    ];
    for (l_tick, l_fired) in l_expected.iter().enumerate() {
        assert_eq!(run(&mut l_sched, l_macro), 1);
        assert_eq!(take_fired(), l_fired.to_vec(), "tick {}", l_tick + 1);
    }
    assert_eq!(l_sched.tick_count(), 10);
}

#[test]
fn registration_order_does_not_change_dispatch_order() {
    let mut l_sched = scheduler::<4>();
    l_sched.register_task(3, 1, TaskCall::Param(record, 3)).unwrap();
    l_sched.register_task(0, 1, TaskCall::Param(record, 0)).unwrap();
    l_sched.register_task(2, 1, TaskCall::Param(record, 2)).unwrap();
    l_sched.start(10).unwrap();

    run(&mut l_sched, 10);
    assert_eq!(take_fired(), vec![0, 2, 3]);
}

#[test]
fn nothing_runs_between_macro_ticks() {
    let mut l_sched = three_leds();
    l_sched.start(100).unwrap();

    assert_eq!(run(&mut l_sched, 99), 0);
    assert!(take_fired().is_empty());
    assert_eq!(l_sched.tick_count(), 0);
}

#[test_log::test]
fn registration_is_validated() {
    let mut l_sched = three_leds();

    assert_eq!(
        l_sched.register_task(3, 1, TaskCall::Param(record, 3)),
        Err(SlotOutOfRange(3))
    );
    assert_eq!(
        l_sched.register_task(usize::MAX, 1, TaskCall::Param(record, 3)),
        Err(SlotOutOfRange(usize::MAX))
    );
    assert_eq!(
        l_sched.register_task(1, 4, TaskCall::Param(record, 9)),
        Err(SlotAlreadyUsed(1))
    );
    assert_eq!(l_sched.task_count(), 3);

    let mut l_sched = scheduler::<2>();
    assert_eq!(
        l_sched.register_task(0, 0, TaskCall::Param(record, 0)),
        Err(InvalidPeriodicity(0))
    );
    assert!(!l_sched.slot_in_use(0));
}

#[test]
fn registration_is_closed_once_started() {
    let mut l_sched = scheduler::<3>();
    l_sched.register_task(0, 1, TaskCall::Param(record, 0)).unwrap();
    l_sched.start(50).unwrap();

    assert_eq!(
        l_sched.register_task(1, 1, TaskCall::Param(record, 1)),
        Err(SchedulerAlreadyStarted)
    );
    assert_eq!(l_sched.start(50), Err(SchedulerAlreadyStarted));
    assert!(!l_sched.slot_in_use(1));
    assert_eq!(l_sched.task_count(), 1);
}

#[test]
fn failed_start_keeps_the_tasks() {
    let mut l_sched = three_leds();
    assert_eq!(l_sched.start(0), Err(TickRange(0)));
    assert_eq!(l_sched.start(0x100_0000), Err(TickRange(0x100_0000)));

    assert!(!l_sched.is_started());
    assert_eq!(l_sched.task_count(), 3);
    assert_eq!(l_sched.timer().mode(), TimerMode::Idle);

    l_sched.register_task(2, 1, TaskCall::Param(record, 2)).unwrap_err();
    l_sched.start(20).unwrap();
    run(&mut l_sched, 20);
    assert_eq!(take_fired(), vec![0]);
}

#[test]
fn start_needs_an_initialized_timer() {
    let mut l_sched: Scheduler<SimulatedSysTick, 2> =
        Scheduler::new(TimerService::new(SimulatedSysTick::new()));
    l_sched.register_task(0, 1, TaskCall::Param(record, 0)).unwrap();
    assert_eq!(l_sched.start(10), Err(TimerNotInitialized));
    assert_eq!(l_sched.task_count(), 1);
}

#[test_log::test]
fn stop_then_start_resumes_the_tick_count() {
    let mut l_sched = three_leds();
    l_sched.start(10).unwrap();
    run(&mut l_sched, 40);
    take_fired();

    l_sched.stop().unwrap();
    assert!(!l_sched.is_started());
    assert_eq!(l_sched.tick_count(), 4);
    assert_eq!(l_sched.timer().mode(), TimerMode::Idle);
    assert_eq!(run(&mut l_sched, 100), 0);

    l_sched.start(10).unwrap();
    run(&mut l_sched, 10);
    assert_eq!(take_fired(), vec![0, 2]);
    assert_eq!(l_sched.tick_count(), 5);
}

#[test]
fn stop_is_idempotent() {
    let mut l_sched = three_leds();
    l_sched.stop().unwrap();
    assert_eq!(l_sched.task_count(), 3);

    l_sched.start(10).unwrap();
    run(&mut l_sched, 15);
    l_sched.stop().unwrap();
    let l_once = (
        l_sched.is_started(),
        l_sched.tick_count(),
        l_sched.timer().mode(),
        l_sched.timer().reload_ticks(),
        l_sched.timer().registers().control(),
    );
    l_sched.stop().unwrap();
    let l_twice = (
        l_sched.is_started(),
        l_sched.tick_count(),
        l_sched.timer().mode(),
        l_sched.timer().reload_ticks(),
        l_sched.timer().registers().control(),
    );
    assert_eq!(l_once, l_twice);
}

fn broken() -> KernelResult<()> {
    Err(KernelError::InvalidConfig("broken task"))
}

#[test_log::test]
fn a_failing_task_does_not_stop_the_others() {
    let mut l_sched = scheduler::<3>();
    l_sched.register_task(0, 1, TaskCall::Param(record, 0)).unwrap();
    l_sched.register_task(1, 1, TaskCall::NoParam(broken)).unwrap();
    l_sched.register_task(2, 1, TaskCall::Param(record, 2)).unwrap();
    l_sched.start(10).unwrap();

    run(&mut l_sched, 30);
    assert_eq!(take_fired(), vec![0, 2, 0, 2, 0, 2]);

    let l_errors = l_sched.errors().unwrap();
    assert_eq!(l_errors.error_count(), 3);
    assert_eq!(
        l_errors.highest_severity(),
        Some(kernel::KernelErrorLevel::Critical)
    );
}
