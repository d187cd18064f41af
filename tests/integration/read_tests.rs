//! Chunked READ.

use rf24boot::app::events::BootEvent;
use rf24boot::config::BootConfig;
use rf24boot::handshake::HandshakeFlag;

use crate::mock_hw::{HwCall, Journal, MockPartition, data_frame, deliver, service};

fn addr_of(frame: &[u8]) -> u32 {
    u32::from_le_bytes([frame[2], frame[3], frame[4], frame[5]])
}

#[test]
fn read_100_bytes_in_27_byte_chunks() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut app = MockPartition::new("app", 100, 27, &journal);
    let image = app.data.clone();
    let mut svc = service(&journal, &flag, BootConfig::default());
    svc.register_partition(&mut app).unwrap();
    svc.init();
    journal.clear();

    deliver(&mut svc, &data_frame(0x02, 0, 100, &[])).unwrap();

    let sent = journal.sent();
    let addrs: Vec<u32> = sent.iter().map(|f| addr_of(f)).collect();
    let payload_lens: Vec<usize> = sent.iter().map(|f| f.len() - 1).collect();
    assert_eq!(addrs, [0, 27, 54, 81]);
    assert_eq!(payload_lens, [32, 32, 32, 24]);

    for f in &sent {
        assert_eq!(f[0], 0x02);
        assert_eq!(f[1], 0, "part index echoed");
        let at = addr_of(f) as usize;
        assert_eq!(&f[6..], &image[at..at + f.len() - 6]);
    }

    let reads: Vec<u32> = journal
        .calls()
        .iter()
        .filter_map(|c| match c {
            HwCall::PartRead { addr, .. } => Some(*addr),
            _ => None,
        })
        .collect();
    assert_eq!(reads, [0, 27, 54, 81]);

    assert_eq!(
        svc.sink().events.last(),
        Some(&BootEvent::ReadServed {
            part: 0,
            bytes: 100,
            packets: 4
        })
    );
}

#[test]
fn read_returns_to_receive_once_after_all_chunks() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut app = MockPartition::new("app", 100, 27, &journal);
    let mut svc = service(&journal, &flag, BootConfig::default());
    svc.register_partition(&mut app).unwrap();
    svc.init();
    journal.clear();

    deliver(&mut svc, &data_frame(0x02, 0, 100, &[])).unwrap();

    let radio = journal.radio_calls();
    assert_eq!(radio.first(), Some(&HwCall::ReadPacket(6)));
    assert_eq!(radio[1], HwCall::StopListening);
    assert_eq!(
        &radio[radio.len() - 2..],
        &[HwCall::QueueSync { ok: true }, HwCall::StartListening]
    );
    assert_eq!(journal.count(|c| matches!(c, HwCall::StopListening)), 1);
    assert_eq!(journal.count(|c| matches!(c, HwCall::StartListening)), 1);
    assert!(svc.is_listening());
}

#[test]
fn read_overshoots_to_chunk_boundary() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut app = MockPartition::new("app", 100, 27, &journal);
    let mut svc = service(&journal, &flag, BootConfig::default());
    svc.register_partition(&mut app).unwrap();
    svc.init();

    deliver(&mut svc, &data_frame(0x02, 0, 30, &[])).unwrap();

    assert_eq!(journal.sent().len(), 2);
    assert_eq!(
        svc.sink().events.last(),
        Some(&BootEvent::ReadServed {
            part: 0,
            bytes: 54,
            packets: 2
        })
    );
}

#[test]
fn zero_length_read_sends_one_chunk() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut app = MockPartition::new("app", 100, 27, &journal);
    let mut svc = service(&journal, &flag, BootConfig::default());
    svc.register_partition(&mut app).unwrap();
    svc.init();

    deliver(&mut svc, &data_frame(0x02, 0, 0, &[])).unwrap();
    let sent = journal.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(addr_of(&sent[0]), 0);
}

#[test]
fn read_from_second_partition_uses_its_io_size() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut app = MockPartition::new("app", 100, 27, &journal);
    let mut cfg = MockPartition::new("cfg", 40, 16, &journal);
    let mut svc = service(&journal, &flag, BootConfig::default());
    svc.register_partition(&mut app).unwrap();
    svc.register_partition(&mut cfg).unwrap();
    svc.init();

    deliver(&mut svc, &data_frame(0x02, 1, 40, &[])).unwrap();
    let lens: Vec<usize> = journal.sent().iter().map(Vec::len).collect();
    assert_eq!(lens, [22, 22, 14]);
    assert!(journal.calls().iter().all(|c| !matches!(
        c,
        HwCall::PartRead { part: "app", .. }
    )));
}

#[test]
fn read_out_of_range_partition_is_ignored() {
    let journal = Journal::new();
    let flag = HandshakeFlag::new();
    let mut app = MockPartition::new("app", 100, 27, &journal);
    let mut svc = service(&journal, &flag, BootConfig::default());
    svc.register_partition(&mut app).unwrap();
    svc.init();
    journal.clear();

    assert_eq!(deliver(&mut svc, &data_frame(0x02, 1, 100, &[])), Ok(true));
    assert_eq!(journal.radio_calls(), vec![HwCall::ReadPacket(6)]);
    assert_eq!(
        svc.sink().events.last(),
        Some(&BootEvent::Ignored { op: 0x02 })
    );
}
