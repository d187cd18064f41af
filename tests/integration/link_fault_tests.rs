//! Link faults and reset escalation.

use rf24boot::app::events::BootEvent;
use rf24boot::config::{BootConfig, RetryPolicy};
use rf24boot::error::LinkFault;
use rf24boot::handshake::HandshakeFlag;

use crate::mock_hw::{HOST, HwCall, Journal, MockPartition, data_frame, deliver, hello_frame, service};

fn position(calls: &[HwCall], pred: impl Fn(&HwCall) -> bool) -> Option<usize> {
    calls.iter().position(pred)
}

#[test]
fn stuck_send_queue_resets_after_full_budget() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut svc = service(&journal, &flag, BootConfig::default());
    svc.init();
    svc.radio_mut().reject_enqueues = u32::MAX;
    journal.clear();

    let budget = RetryPolicy::default().attempt_budget().unwrap();
    assert_eq!(budget, 255);

    assert_eq!(
        deliver(&mut svc, &hello_frame(HOST)),
        Err(LinkFault::SendDeadtime { attempts: budget })
    );

    let calls = journal.calls();
    assert_eq!(journal.count(|c| matches!(c, HwCall::Rejected)), budget as usize);
    assert_eq!(journal.count(|c| matches!(c, HwCall::Reset)), 1);
    assert_eq!(calls.last(), Some(&HwCall::Reset), "nothing may follow the reset");

    let last_reject = calls.iter().rposition(|c| matches!(c, HwCall::Rejected)).unwrap();
    let reset = position(&calls, |c| matches!(c, HwCall::Reset)).unwrap();
    assert!(last_reject < reset);
    assert!(
        calls[last_reject..reset]
            .iter()
            .all(|c| matches!(c, HwCall::Rejected | HwCall::DelayNs(_))),
        "no radio traffic between the last attempt and the reset"
    );

    assert_eq!(svc.platform().resets, 1);
    assert!(!flag.is_set(), "handshake never completed");
    assert_eq!(
        svc.sink().events.last(),
        Some(&BootEvent::LinkFault(LinkFault::SendDeadtime {
            attempts: budget
        }))
    );
}

#[test]
fn queue_clearing_on_last_attempt_avoids_reset() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut svc = service(&journal, &flag, BootConfig::default());
    svc.init();
    svc.radio_mut().reject_enqueues = 254;

    assert_eq!(deliver(&mut svc, &hello_frame(HOST)), Ok(true));
    assert_eq!(journal.count(|c| matches!(c, HwCall::Rejected)), 254);
    assert_eq!(journal.sent().len(), 1);
    assert_eq!(svc.platform().resets, 0);
    assert!(svc.is_listening());
}

#[test]
fn deadtime_is_measured_on_the_platform_clock() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut config = BootConfig::default();
    config.retry = RetryPolicy::Deadtime {
        deadtime_ms: 100,
        slice_ms: 10,
    };
    let mut app = MockPartition::new("app", 100, 27, &journal);
    let mut svc = service(&journal, &flag, config);
    svc.register_partition(&mut app).unwrap();
    svc.init();
    svc.radio_mut().reject_enqueues = u32::MAX;

    assert_eq!(
        deliver(&mut svc, &data_frame(0x02, 0, 100, &[])),
        Err(LinkFault::SendDeadtime { attempts: 10 })
    );
    let slept: u64 = journal
        .calls()
        .iter()
        .filter_map(|c| match c {
            HwCall::DelayNs(ns) => Some(u64::from(*ns)),
            _ => None,
        })
        .sum();
    assert_eq!(slept, 100_000_000);
    assert_eq!(svc.platform().resets, 1);
}

#[test]
fn sync_timeout_resets_once_and_stays_in_transmit() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut app = MockPartition::new("app", 100, 27, &journal);
    let mut svc = service(&journal, &flag, BootConfig::default());
    svc.register_partition(&mut app).unwrap();
    svc.init();
    svc.radio_mut().sync_ok = false;
    journal.clear();

    assert_eq!(
        deliver(&mut svc, &data_frame(0x02, 0, 100, &[])),
        Err(LinkFault::SyncTimeout)
    );

    let calls = journal.calls();
    assert_eq!(journal.sent().len(), 4, "all chunks were queued");
    assert_eq!(journal.count(|c| matches!(c, HwCall::QueueSync { ok: false })), 1);
    assert_eq!(journal.count(|c| matches!(c, HwCall::StartListening)), 0);
    assert_eq!(journal.count(|c| matches!(c, HwCall::Reset)), 1);
    assert_eq!(calls.last(), Some(&HwCall::Reset));
    assert!(!svc.is_listening());
    assert!(!svc.radio().listening);
    assert_eq!(
        svc.sink().events.last(),
        Some(&BootEvent::LinkFault(LinkFault::SyncTimeout))
    );
}

#[test]
fn hello_sync_timeout_leaves_flag_marked() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut svc = service(&journal, &flag, BootConfig::default());
    svc.init();
    svc.radio_mut().sync_ok = false;

    assert_eq!(
        deliver(&mut svc, &hello_frame(HOST)),
        Err(LinkFault::SyncTimeout)
    );
    assert!(flag.is_set(), "HELLO reply was queued before the sync");
    assert_eq!(svc.platform().resets, 1);
}

#[test]
fn unbounded_policy_rides_out_a_long_stall() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut config = BootConfig::default();
    config.retry = RetryPolicy::Unbounded;
    let mut svc = service(&journal, &flag, config);
    svc.init();
    svc.radio_mut().reject_enqueues = 10_000;

    assert_eq!(deliver(&mut svc, &hello_frame(HOST)), Ok(true));
    assert_eq!(journal.count(|c| matches!(c, HwCall::Rejected)), 10_000);
    assert_eq!(journal.count(|c| matches!(c, HwCall::DelayNs(_))), 0);
    assert_eq!(svc.platform().resets, 0);
}

#[test]
fn next_poll_after_simulated_reset_still_serves() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut svc = service(&journal, &flag, BootConfig::default());
    svc.init();
    svc.radio_mut().sync_ok = false;
    assert!(deliver(&mut svc, &hello_frame(HOST)).is_err());

    svc.radio_mut().sync_ok = true;
    journal.clear();
    assert_eq!(deliver(&mut svc, &hello_frame(HOST)), Ok(true));
    assert_eq!(journal.sent().len(), 1);
    assert!(svc.is_listening());
}
