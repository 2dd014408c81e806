//! Process-wide API lifecycle test
//!
//! The free functions share one scheduler slot per process, so the whole
//! lifecycle is exercised in a single test to keep it serial.

use std::sync::{Arc, Mutex};

use monosched::SchedError;

#[test]
fn process_wide_lifecycle() {
    // Nothing installed yet.
    assert_eq!(
        monosched::spawn(|_| {}, 0).unwrap_err(),
        SchedError::NotInitialized
    );
    assert_eq!(monosched::signal(0).unwrap_err(), SchedError::NotInitialized);
    assert_eq!(monosched::tick().unwrap_err(), SchedError::NotInitialized);

    // Invalid parameters leave the slot empty.
    assert_eq!(monosched::init(0, 1).unwrap_err(), SchedError::InvalidQuantum);
    assert_eq!(
        monosched::init(2, 500).unwrap_err(),
        SchedError::TooManyIoDevices {
            requested: 500,
            max: monosched::MAX_IO_DEVICES
        }
    );

    monosched::init(2, 1).unwrap();
    assert_eq!(
        monosched::init(2, 1).unwrap_err(),
        SchedError::AlreadyInitialized
    );

    // Small workload through the free functions: the root unit waits on io 0
    // and a lower-priority child signals it back to ready.
    let events: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&events);
    monosched::spawn(
        move |_| {
            let ce = Arc::clone(&e);
            monosched::spawn(
                move |_| {
                    ce.lock().unwrap().push("child:signalling");
                    assert_eq!(monosched::signal(0).unwrap(), 1);
                },
                1,
            )
            .unwrap();

            e.lock().unwrap().push("root:waiting");
            monosched::wait(0).unwrap();
            monosched::tick().unwrap();
            e.lock().unwrap().push("root:done");
        },
        3,
    )
    .unwrap();

    monosched::shutdown();
    assert_eq!(
        *events.lock().unwrap(),
        vec!["root:waiting", "child:signalling", "root:done"]
    );

    // Shutdown cleared the slot: idempotent, and a fresh init is allowed.
    monosched::shutdown();
    monosched::init(1, 0).unwrap();
    monosched::shutdown();
}
