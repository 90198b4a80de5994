use hal_sync::arch::Host;
use hal_sync::{Exclusive, InstanceTable, Masked, SyncError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[derive(Debug)]
struct Adc {
    channel: u8,
}

static ADC0: Adc = Adc { channel: 0 };
static ADC1: Adc = Adc { channel: 1 };

#[test]
fn install_lookup_remove() {
    let table: InstanceTable<Adc, 2, Exclusive<Host>> = InstanceTable::new();
    assert_eq!(table.len(), 2);
    assert!(table.get(0).is_none());

    table.install(0, &ADC0).unwrap();
    table.install(1, &ADC1).unwrap();
    assert_eq!(table.get(0).map(|a| a.channel), Some(0));
    assert_eq!(table.get(1).map(|a| a.channel), Some(1));

    table.remove(0, &ADC0).unwrap();
    assert!(table.get(0).is_none());
    assert!(table.get(1).is_some());
}

#[test]
fn second_installer_is_refused() {
    let table: InstanceTable<Adc, 1, Masked<Host>> = InstanceTable::new();
    table.install(0, &ADC0).unwrap();
    assert_eq!(table.install(0, &ADC1), Err(SyncError::Occupied { index: 0 }));
    assert!(std::ptr::eq(table.get(0).unwrap(), &ADC0));
}

#[test]
fn only_the_owner_can_remove() {
    let table: InstanceTable<Adc, 1, Exclusive<Host>> = InstanceTable::new();
    assert_eq!(table.remove(0, &ADC0), Err(SyncError::NotRegistered { index: 0 }));

    table.install(0, &ADC0).unwrap();
    assert_eq!(table.remove(0, &ADC1), Err(SyncError::NotRegistered { index: 0 }));
    assert!(table.get(0).is_some());
}

#[test]
fn replace_hands_over_ownership() {
    let table: InstanceTable<Adc, 1, Exclusive<Host>> = InstanceTable::new();
    table.install(0, &ADC0).unwrap();

    assert_eq!(
        table.replace(0, None, Some(&ADC1)),
        Err(SyncError::Mismatch { index: 0 })
    );
    table.replace(0, Some(&ADC0), Some(&ADC1)).unwrap();
    assert_eq!(table.get(0).map(|a| a.channel), Some(1));
}

#[test]
fn bad_index_is_reported() {
    let table: InstanceTable<Adc, 2, Exclusive<Host>> = InstanceTable::new();
    assert!(table.get(2).is_none());
    assert_eq!(
        table.install(2, &ADC0),
        Err(SyncError::IndexOutOfRange { index: 2, len: 2 })
    );
}

#[test]
fn racing_installers_have_one_winner() {
    static DRIVERS: [Adc; 6] = [
        Adc { channel: 0 },
        Adc { channel: 1 },
        Adc { channel: 2 },
        Adc { channel: 3 },
        Adc { channel: 4 },
        Adc { channel: 5 },
    ];

    let table: Arc<InstanceTable<Adc, 1, Exclusive<Host>>> = Arc::new(InstanceTable::new());
    let winners = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(DRIVERS.len()));

    let handles: Vec<_> = DRIVERS
        .iter()
        .map(|driver| {
            let table = Arc::clone(&table);
            let winners = Arc::clone(&winners);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                if table.install(0, driver).is_ok() {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert!(table.get(0).is_some());
}

#[test]
fn reset_clears_without_the_owner() {
    let table: InstanceTable<Adc, 2, Exclusive<Host>> = InstanceTable::new();
    table.install(1, &ADC1).unwrap();

    table.reset(1).unwrap();
    assert!(table.get(1).is_none());

    // The channel is free for the next driver, and resetting twice is fine.
    table.install(1, &ADC0).unwrap();
    table.reset(1).unwrap();
    table.reset(1).unwrap();
    assert!(table.get(1).is_none());
}

#[test]
fn reset_rejects_a_bad_index() {
    let table: InstanceTable<Adc, 2, Masked<Host>> = InstanceTable::new();
    assert_eq!(
        table.reset(5),
        Err(SyncError::IndexOutOfRange { index: 5, len: 2 })
    );
}
