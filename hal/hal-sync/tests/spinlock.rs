use hal_sync::arch::Host;
use hal_sync::{Exclusive, LockState, LockStrategy, Masked, Spinlock};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

type ExclusiveLock = Spinlock<Exclusive<Host>>;
type MaskedLock = Spinlock<Masked<Host>>;

/// Plain data only ever touched under the lock.
struct Shared<S> {
    lock: Spinlock<S>,
    value: UnsafeCell<usize>,
}

unsafe impl<S> Sync for Shared<S> {}

impl<S> Shared<S> {
    fn new() -> Self {
        Self {
            lock: Spinlock::new(),
            value: UnsafeCell::new(0),
        }
    }
}

fn try_lock_is_deterministic<S: LockStrategy>() {
    let l: Spinlock<S> = Spinlock::new();
    assert_eq!(l.state(), LockState::Unlocked);

    assert!(l.try_lock());
    assert_eq!(l.state(), LockState::Locked);

    // Held: fails and leaves the cell alone.
    assert!(!l.try_lock());
    assert_eq!(l.state(), LockState::Locked);

    unsafe { l.unlock() };
    assert_eq!(l.state(), LockState::Unlocked);
}

fn lock_unlock_round_trip<S: LockStrategy>() {
    let l: Spinlock<S> = Spinlock::new();
    for _ in 0..3 {
        l.lock();
        assert!(l.is_locked());
        unsafe { l.unlock() };
        assert_eq!(l.state(), LockState::Unlocked);
    }
}

fn contended_increments_are_exact_and_exclusive<S: LockStrategy + 'static>() {
    let threads = 8; // keep small for determinism
    let iters = 2_000;

    let shared = Arc::new(Shared::<S>::new());
    let in_cs = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(threads));

    let mut handles = Vec::with_capacity(threads);
    for _ in 0..threads {
        let shared = Arc::clone(&shared);
        let in_cs = Arc::clone(&in_cs);
        let start = Arc::clone(&start);
        handles.push(thread::spawn(move || {
            start.wait();
            for _ in 0..iters {
                shared.lock.lock();
                let prev = in_cs.fetch_add(1, Ordering::SeqCst);
                assert_eq!(prev, 0, "mutual exclusion violated");
                unsafe { *shared.value.get() += 1 };
                in_cs.fetch_sub(1, Ordering::SeqCst);
                unsafe { shared.lock.unlock() };

                // yield only AFTER releasing the lock to reduce convoy effects
                thread::yield_now();
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(unsafe { *shared.value.get() }, threads * iters);
    assert_eq!(shared.lock.state(), LockState::Unlocked);
}

/// A second context "preempts" the holder at an arbitrary point and must
/// not get in until the holder releases.
fn preempting_context_is_kept_out<S: LockStrategy + 'static>() {
    let lock = Arc::new(Spinlock::<S>::new());
    let held = Arc::new(Barrier::new(2));
    let probed = Arc::new(Barrier::new(2));

    lock.lock();

    let isr = {
        let lock = Arc::clone(&lock);
        let held = Arc::clone(&held);
        let probed = Arc::clone(&probed);
        thread::spawn(move || {
            held.wait();
            let got_while_held = lock.try_lock();
            probed.wait();
            probed.wait();
            let got_after_release = lock.try_lock();
            if got_after_release {
                unsafe { lock.unlock() };
            }
            (got_while_held, got_after_release)
        })
    };

    held.wait();
    probed.wait();
    unsafe { lock.unlock() };
    probed.wait();

    assert_eq!(isr.join().unwrap(), (false, true));
}

#[test]
fn exclusive_try_lock_is_deterministic() {
    try_lock_is_deterministic::<Exclusive<Host>>();
}

#[test]
fn masked_try_lock_is_deterministic() {
    try_lock_is_deterministic::<Masked<Host>>();
}

#[test]
fn exclusive_round_trip() {
    lock_unlock_round_trip::<Exclusive<Host>>();
}

#[test]
fn masked_round_trip() {
    lock_unlock_round_trip::<Masked<Host>>();
}

#[test]
fn exclusive_contended_increments() {
    contended_increments_are_exact_and_exclusive::<Exclusive<Host>>();
}

#[test]
fn masked_contended_increments() {
    contended_increments_are_exact_and_exclusive::<Masked<Host>>();
}

#[test]
fn exclusive_keeps_preempting_context_out() {
    preempting_context_is_kept_out::<Exclusive<Host>>();
}

#[test]
fn masked_keeps_preempting_context_out() {
    preempting_context_is_kept_out::<Masked<Host>>();
}

#[test]
fn failed_try_lock_drops_the_reservation() {
    let l: ExclusiveLock = Spinlock::locked();
    assert!(!l.try_lock());
    assert!(!Host::has_reservation());
    assert!(l.is_locked());
}

#[test]
fn try_lock_retries_lost_reservations_on_a_free_lock() {
    let l: ExclusiveLock = Spinlock::new();
    Host::inject_reservation_loss(2);
    assert!(l.try_lock());
    assert!(!Host::has_reservation());
    unsafe { l.unlock() };
}

#[test]
fn lock_retries_lost_reservations() {
    let l: ExclusiveLock = Spinlock::new();
    Host::inject_reservation_loss(5);
    l.lock();
    assert!(l.is_locked());
    unsafe { l.unlock() };
}

#[test]
fn lock_waits_for_the_holder() {
    let lock = Arc::new(ExclusiveLock::locked());
    let acquired = Arc::new(AtomicBool::new(false));

    let waiter = {
        let lock = Arc::clone(&lock);
        let acquired = Arc::clone(&acquired);
        thread::spawn(move || {
            lock.lock();
            acquired.store(true, Ordering::SeqCst);
            unsafe { lock.unlock() };
        })
    };

    thread::sleep(std::time::Duration::from_millis(20));
    assert!(!acquired.load(Ordering::SeqCst));

    unsafe { lock.unlock() };
    waiter.join().unwrap();
    assert!(acquired.load(Ordering::SeqCst));
}

#[test]
fn bounded_retry_gives_up_on_a_held_lock() {
    let l: MaskedLock = Spinlock::locked();
    assert!(l.try_lock_for(16).is_err());
    assert!(l.is_locked());
}
