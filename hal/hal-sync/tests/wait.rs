use hal_sync::arch::{self, Host, InterruptMask};
use hal_sync::{AtomicSlot, Exclusive, Fenced, IrqGuard};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

fn wait_all() {
    hal_sync::sleep();
    Fenced::<Host>::wait();
    arch::wait_for_interrupt::<Host>();
}

#[test]
fn wait_returns_with_interrupts_enabled() {
    assert!(Host::interrupts_enabled());
    wait_all();
    assert!(Host::interrupts_enabled());
    assert!(!Host::has_reservation());
}

#[test]
fn wait_keeps_a_callers_mask() {
    let _irq = IrqGuard::<Host>::new();
    wait_all();
    assert!(!Host::interrupts_enabled());
    assert!(!Host::has_reservation());
}

#[test]
fn wait_leaves_exchange_usable() {
    let slot: AtomicSlot<usize, Exclusive<Host>> = AtomicSlot::empty();
    wait_all();
    assert_eq!(slot.compare_exchange(0, 1), Ok(0));
    assert!(!Host::has_reservation());
}

/// The usual idle loop: wait until another context publishes a flag.
#[test]
fn idle_loop_sees_the_wakeup_flag() {
    let ready = Arc::new(AtomicBool::new(false));

    let isr = {
        let ready = Arc::clone(&ready);
        thread::spawn(move || ready.store(true, Ordering::Release))
    };

    while !ready.load(Ordering::Acquire) {
        hal_sync::sleep();
    }
    isr.join().unwrap();
}
