//! Integration Tests for the public buffer API
//!
//! Exercises buffers and slots through the crate root, including the
//! trait objects and multi-threaded access.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tidy_buffer::{
    AtomicSequence, Buffer, BufferConfig, BufferError, ExistenceCheck, ManualClock, Reader,
    ReaderWriter, SingleSlot, Writer,
};

const T0: u64 = 1_700_000_000_000;

// == Helper Functions ==

#[derive(Debug, Clone, PartialEq)]
struct Message {
    a: String,
    b: i64,
}

fn mock_messages(count: usize) -> Vec<Message> {
    (0..count)
        .map(|i| Message {
            a: i.to_string(),
            b: i as i64 * 10,
        })
        .collect()
}

fn create_test_buffer() -> (Buffer<Message>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let buffer = Buffer::new(BufferConfig::default())
        .unwrap()
        .with_clock(clock.clone());
    (buffer, clock)
}

// == Scenario Tests ==

#[test]
fn test_read_expires_by_ttl_then_by_access_count() {
    let (buffer, clock) = create_test_buffer();
    let limit = BufferConfig::default().access_limit;

    let x = buffer.write(Message { a: "1".into(), b: 2 });
    assert!(buffer.read(x).is_some());
    clock.advance(Duration::from_secs(11));
    assert!(buffer.read(x).is_none());

    let x2 = buffer.write(Message { a: "1".into(), b: 2 });
    for _ in 0..limit - 1 {
        buffer.read(x2);
    }
    assert!(buffer.read(x2).is_some());
    assert!(buffer.read(x2).is_none());
}

#[test]
fn test_write_then_read_all_below_target() {
    let (buffer, _) = create_test_buffer();
    let messages = mock_messages(10);

    let keys: Vec<i64> = messages.iter().map(|m| buffer.write(m.clone())).collect();

    for (key, message) in keys.iter().zip(&messages) {
        assert_eq!(buffer.read(*key).as_ref(), Some(message));
    }
}

#[test]
fn test_twenty_writes_one_second_apart() {
    let (buffer, clock) = create_test_buffer();

    let mut keys = Vec::new();
    for message in mock_messages(20) {
        keys.push(buffer.write(message));
        clock.advance(Duration::from_secs(1));
    }

    for key in keys {
        let found = buffer.read(key).is_some();
        if key <= 10 {
            assert!(!found, "key {key} should have expired");
        } else {
            assert!(found, "key {key} should still be readable");
        }
    }
}

#[test]
fn test_capacity_overflow_trims_to_target() {
    let (buffer, clock) = create_test_buffer();
    let config = *buffer.config();

    let mut keys = Vec::new();
    for message in mock_messages(config.capacity + 1) {
        keys.push(buffer.write(message));
        clock.advance(Duration::from_millis(5));
    }

    assert_eq!(buffer.len(), config.target_length);
    let survivors: HashSet<i64> = keys.iter().copied().filter(|k| buffer.exist(*k)).collect();
    let newest: HashSet<i64> = keys[keys.len() - config.target_length..]
        .iter()
        .copied()
        .collect();
    assert_eq!(survivors, newest);
}

#[test]
fn test_invalid_configs_rejected() {
    let bad = [
        BufferConfig::default().with_capacity(10),
        BufferConfig::default().with_capacity(3),
        BufferConfig::default().with_ttl_seconds(0.0),
        BufferConfig::default().with_ttl_seconds(-1.0),
        BufferConfig::default().with_access_limit(0),
        BufferConfig::default().with_target_length(0),
    ];

    for config in bad {
        assert!(matches!(
            Buffer::<Message>::new(config),
            Err(BufferError::InvalidConfig(_))
        ));
        assert!(matches!(
            SingleSlot::<Message>::new(config),
            Err(BufferError::InvalidConfig(_))
        ));
    }
}

// == Trait Tests ==

fn round_trip<S: ReaderWriter<String> + ExistenceCheck>(cache: &S) {
    let key = cache.write("payload".to_string());
    assert!(cache.exist(key));
    assert_eq!(cache.read(key), Some("payload".to_string()));
}

#[test]
fn test_both_caches_through_traits() {
    let buffer: Buffer<String> = Buffer::new(BufferConfig::default()).unwrap();
    let slot: SingleSlot<String> = SingleSlot::new(BufferConfig::default()).unwrap();

    round_trip(&buffer);
    round_trip(&slot);
}

#[test]
fn test_trait_objects() {
    let buffer: Buffer<u64> = Buffer::new(BufferConfig::default()).unwrap();
    let writer: &dyn Writer<u64> = &buffer;
    let reader: &dyn Reader<u64> = &buffer;

    let key = writer.write(7);
    assert_eq!(reader.read(key), Some(7));
}

// == Single Slot Tests ==

#[test]
fn test_slot_overwrite_with_shared_sequence() {
    let sequence = AtomicSequence::shared();
    let clock = Arc::new(ManualClock::new(T0));
    let slots: Vec<SingleSlot<Message>> = (0..3)
        .map(|_| {
            SingleSlot::with_sequence(BufferConfig::default(), sequence.clone())
                .unwrap()
                .with_clock(clock.clone())
        })
        .collect();

    let mut keys = Vec::new();
    for (i, message) in mock_messages(6).into_iter().enumerate() {
        keys.push(slots[i % 3].write(message));
    }

    assert_eq!(keys, vec![1, 2, 3, 4, 5, 6]);
    for (i, slot) in slots.iter().enumerate() {
        assert!(!slot.exist(keys[i]), "overwritten key must be unreadable");
        assert_eq!(slot.current_key(), Some(keys[i + 3]));
        assert!(slot.read(keys[i + 3]).is_some());
    }
}

// == Concurrency Tests ==

#[test]
fn test_concurrent_writes_get_unique_keys() {
    let config = BufferConfig::default()
        .with_target_length(1_000)
        .with_capacity(2_000);
    let buffer: Buffer<usize> = Buffer::new(config).unwrap();

    let keys: Vec<i64> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let buffer = &buffer;
                s.spawn(move || (0..100).map(|i| buffer.write(t * 100 + i)).collect::<Vec<_>>())
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let unique: HashSet<i64> = keys.iter().copied().collect();
    assert_eq!(unique.len(), 800);
    assert_eq!(buffer.len(), 800);
    assert_eq!(buffer.stats().writes, 800);
}

#[test]
fn test_concurrent_write_then_read_same_thread() {
    let buffer: Buffer<String> = Buffer::new(BufferConfig::default()).unwrap();

    thread::scope(|s| {
        for t in 0..4 {
            let buffer = &buffer;
            s.spawn(move || {
                for i in 0..200 {
                    let payload = format!("{t}-{i}");
                    let key = buffer.write(payload.clone());
                    // a tidy from another thread may evict it, never corrupt it
                    if let Some(found) = buffer.read(key) {
                        assert_eq!(found, payload);
                    }
                }
            });
        }
    });

    assert!(buffer.len() <= BufferConfig::default().capacity);
}

#[test]
fn test_concurrent_reads_respect_access_limit() {
    let config = BufferConfig::default().with_access_limit(40);
    let buffer: Buffer<u8> = Buffer::new(config).unwrap();
    let key = buffer.write(1);

    let hits: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let buffer = &buffer;
                s.spawn(move || (0..20).filter(|_| buffer.read(key).is_some()).count())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(hits, 40);
}
