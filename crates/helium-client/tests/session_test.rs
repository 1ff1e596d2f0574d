//! Session lifecycle and synchronous operations.

mod common;

use atom_protocol::{Connection, Info, Status};
use common::scripted;
use helium_client::{Helium, HeliumError, POLL_RETRIES_5S};

#[test]
fn test_info_snapshot() {
    let (atom, script) = scripted();
    script.borrow_mut().info = Ok(Info {
        mac: 0xc0ff_ee00_0000_0001,
        uptime: 42,
        time: 0,
        fw_version: 0x0102_0304,
        radio_count: 2,
    });
    let helium = Helium::new(atom);

    let info = helium.info().expect("info should succeed");
    assert_eq!(info.mac, 0xc0ff_ee00_0000_0001);
    assert_eq!(info.uptime, 42);
    assert_eq!(info.radio_count, 2);
    assert_eq!(info.firmware_version().to_string(), "1.2.3.4");
}

#[test]
fn test_info_failure_maps_status() {
    let (atom, script) = scripted();
    script.borrow_mut().info = Err(Status::ErrCommunication);
    let helium = Helium::new(atom);
    assert!(matches!(helium.info(), Err(HeliumError::Communication(_))));
}

#[test]
fn test_needs_reset_and_reset() {
    let (atom, script) = scripted();
    script.borrow_mut().needs_reset = true;
    let helium = Helium::new(atom);

    assert!(helium.needs_reset());
    helium.reset().expect("reset should succeed");

    script.borrow_mut().reset_status = Status::ErrDropped;
    assert!(matches!(helium.reset(), Err(HeliumError::Dropped)));
}

#[test]
fn test_connect_polls_join_state() {
    let (atom, script) = scripted();
    script.borrow_mut().connected_on_check = Some(3);
    let helium = Helium::new(atom);

    helium.connect(POLL_RETRIES_5S).expect("should join on third check");
    let script = script.borrow();
    assert_eq!(script.count("connect"), 1);
    assert_eq!(script.connected_checks, 3);
    // Waits only between checks
    assert_eq!(script.waits, 2);
}

#[test]
fn test_connect_gives_up_after_budget() {
    let (atom, script) = scripted();
    script.borrow_mut().connected_on_check = None;
    let helium = Helium::new(atom);

    assert!(matches!(helium.connect(4), Err(HeliumError::NotConnected)));
    assert_eq!(script.borrow().connected_checks, 4);
}

#[test]
fn test_connect_with_zero_retries() {
    let (atom, script) = scripted();
    let helium = Helium::new(atom);
    assert!(matches!(helium.connect(0), Err(HeliumError::NotConnected)));
    assert_eq!(script.borrow().connected_checks, 0);
}

#[test]
fn test_connect_stops_on_failure_status() {
    let (atom, script) = scripted();
    {
        let mut script = script.borrow_mut();
        script.connected_on_check = None;
        script.not_connected_status = Status::ErrCommunication;
    }
    let helium = Helium::new(atom);
    assert!(matches!(helium.connect(5), Err(HeliumError::Communication(_))));
    assert_eq!(script.borrow().connected_checks, 1);
}

#[test]
fn test_connect_failure_is_not_retried_into_success() {
    for (status, expected) in [
        (Status::ErrDropped, "dropped"),
        (Status::ErrKeepAwake, "keep awake"),
        (Status::Unknown(9), "unknown status: 9"),
    ] {
        let (atom, script) = scripted();
        {
            // Fails on the first check, would report joined on the second
            let mut script = script.borrow_mut();
            script.connected_on_check = Some(2);
            script.not_connected_status = status;
        }
        let helium = Helium::new(atom);

        let err = helium.connect(5).expect_err("join should fail");
        assert_eq!(err.to_string(), expected);
        assert_eq!(script.borrow().connected_checks, 1);
        assert_eq!(script.borrow().waits, 0);
    }
}

#[test]
fn test_connect_request_rejected() {
    let (atom, script) = scripted();
    script.borrow_mut().connect_status = Status::ErrKeepAwake;
    let helium = Helium::new(atom);

    assert!(matches!(helium.connect(5), Err(HeliumError::KeepAwake)));
    assert_eq!(script.borrow().connected_checks, 0);
}

#[test]
fn test_connected_query() {
    let (atom, script) = scripted();
    script.borrow_mut().connected_on_check = Some(2);
    let helium = Helium::new(atom);

    assert!(!helium.connected());
    assert!(helium.connected());
}

#[test]
fn test_sleep_and_quick_rejoin() {
    let (atom, script) = scripted();
    let saved = Connection::from_bytes(&[1, 2, 3, 4]).unwrap();
    script.borrow_mut().sleep_result = Ok(saved.clone());
    let helium = Helium::new(atom);

    let connection = helium.sleep().expect("sleep should succeed");
    assert_eq!(connection, saved);

    helium.connect_with(Some(&connection), 1).expect("rejoin");
    assert_eq!(script.borrow().last_connection, Some(saved));
}

#[test]
fn test_sleep_refused_while_busy() {
    let (atom, script) = scripted();
    script.borrow_mut().sleep_result = Err(Status::ErrKeepAwake);
    let helium = Helium::new(atom);
    assert!(matches!(helium.sleep(), Err(HeliumError::KeepAwake)));
}

#[test]
fn test_close_twice_releases_once() {
    let (atom, script) = scripted();
    let helium = Helium::new(atom);

    helium.close();
    helium.close();
    assert!(helium.is_closed());
    assert_eq!(script.borrow().releases, 1);

    drop(helium);
    assert_eq!(script.borrow().releases, 1);
}

#[test]
fn test_drop_releases() {
    let (atom, script) = scripted();
    {
        let _helium = Helium::new(atom);
    }
    assert_eq!(script.borrow().releases, 1);
}

#[test]
fn test_use_after_close_fails() {
    let (atom, script) = scripted();
    let helium = Helium::new(atom);
    helium.close();

    assert!(matches!(helium.info(), Err(HeliumError::Closed)));
    assert!(matches!(helium.reset(), Err(HeliumError::Closed)));
    assert!(matches!(helium.connect(1), Err(HeliumError::Closed)));
    assert!(matches!(helium.sleep(), Err(HeliumError::Closed)));
    assert!(script.borrow().calls.is_empty());
}

#[test]
#[should_panic(expected = "used after close")]
fn test_connected_after_close_panics() {
    let (atom, _script) = scripted();
    let helium = Helium::new(atom);
    helium.close();
    helium.connected();
}

#[test]
fn test_open_missing_device() {
    let result = Helium::open("/dev/does-not-exist-helium");
    assert!(matches!(result, Err(HeliumError::Communication(_))));
}
