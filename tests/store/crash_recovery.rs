//! Crash Recovery Tests
//!
//! Simulates crash scenarios by truncating the WAL mid-line, corrupting
//! the snapshot, and losing files between steps of the write path.

use crate::common::*;
use std::fs;

#[test]
fn reopen_without_checkpoint_keeps_everything() {
    let mut t = TestStore::new_strict();
    for i in 0..50 {
        t.save(&format!("k{}", i), &[i as f64, (i * i) as f64, 0.5]);
    }
    t.reopen();

    let store = t.store();
    assert_eq!(store.count(), 50);
    for i in 0..50 {
        let got = store.get(&format!("k{}", i)).unwrap();
        assert_eq!(got.values(), &[i as f64, (i * i) as f64, 0.5]);
    }
}

#[test]
fn exact_values_survive_restart() {
    let mut t = TestStore::new();
    let tricky = [0.1 + 0.2, 1.0 / 3.0, -0.0, f64::MIN_POSITIVE, 1e308, -2.5e-310];
    t.save("tricky", &tricky);
    t.reopen();

    let got = t.store().get("tricky").unwrap();
    for (a, b) in got.values().iter().zip(tricky.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn torn_wal_tail_recovers_prefix() {
    let mut t = TestStore::new();
    t.save("a", &[1.0, 2.0]);
    t.save("b", &[3.0, 4.0]);
    t.close();

    // Simulate the snapshot never being written and the last append cut short
    fs::remove_file(t.db_path()).unwrap();
    append_raw(&t.wal_path(), br#"{"id":"c","values":[5.0,"#);

    t.reopen();
    let store = t.store();
    assert_eq!(store.count(), 2);
    assert!(store.contains("a"));
    assert!(store.contains("b"));
    assert!(!store.contains("c"));
    assert_eq!(store.recovery_stats().wal.malformed, 1);
}

#[test]
fn write_after_torn_tail_is_not_lost() {
    let mut t = TestStore::new();
    t.save("a", &[1.0]);
    t.close();
    append_raw(&t.wal_path(), br#"{"id":"partial","val"#);

    // Reopen checkpoints and clears the WAL, so tear it again by hand
    t.reopen();
    append_raw(&t.wal_path(), br#"{"id":"again","#);
    t.save("b", &[2.0]);
    t.close();
    fs::remove_file(t.db_path()).unwrap();

    t.reopen();
    let store = t.store();
    assert!(store.contains("b"));
    assert!(!store.contains("again"));
}

#[test]
fn truncated_wal_line_in_middle_is_skipped() {
    let mut t = TestStore::new();
    t.save("a", &[1.0]);
    t.save("b", &[2.0]);
    t.close();
    fs::remove_file(t.db_path()).unwrap();

    // Chop the last byte of the first line's closing brace
    let content = fs::read_to_string(t.wal_path()).unwrap();
    let first_len = content.find('\n').unwrap() as u64;
    corrupt_file_at_offset(&t.wal_path(), first_len - 1, b" ");

    t.reopen();
    let store = t.store();
    assert!(!store.contains("a"));
    assert!(store.contains("b"));
}

#[test]
fn corrupted_snapshot_falls_back_to_wal() {
    let mut t = TestStore::new();
    t.save("a", &[1.0, 1.0]);
    t.save("b", &[2.0, 2.0]);
    t.close();

    let size = file_size(&t.db_path());
    corrupt_file_at_offset(&t.db_path(), size - 4, &[0xFF; 4]);

    t.reopen();
    let store = t.store();
    assert_eq!(store.recovery_stats().snapshot_records, 0);
    assert_eq!(store.count(), 2);
}

#[test]
fn truncated_snapshot_after_checkpoint_starts_empty() {
    let mut t = TestStore::new();
    t.save("a", &[1.0]);
    t.store().checkpoint().unwrap();
    t.close();

    // Nothing left in the WAL to fall back on
    truncate_file(&t.db_path(), 10);
    t.reopen();
    assert_eq!(t.store().count(), 0);
}

#[test]
fn stale_wal_entry_never_overrides_snapshot() {
    let mut t = TestStore::new();
    t.save("doc", &[1.0]);
    t.close();

    // A WAL line left over from an older run
    let old_wal = fs::read(t.wal_path()).unwrap();
    t.reopen();
    t.store()
        .save(record("doc", &[2.0]))
        .unwrap();
    t.store().checkpoint().unwrap();
    t.close();
    fs::write(t.wal_path(), old_wal).unwrap();

    t.reopen();
    assert_eq!(t.store().get("doc").unwrap().values(), &[2.0]);
    assert_eq!(t.store().recovery_stats().skipped_present, 1);
}

#[test]
fn delete_is_durable() {
    let mut t = TestStore::new();
    t.save("keep", &[1.0]);
    t.save("drop", &[2.0]);
    assert!(t.store().delete("drop").unwrap());
    t.reopen();

    assert_eq!(t.store().all_ids(), vec![VectorId::new("keep").unwrap()]);
}

#[test]
fn delete_is_durable_even_if_snapshot_is_lost() {
    let mut t = TestStore::new();
    t.save("keep", &[1.0]);
    t.save("drop", &[2.0]);
    t.store().delete("drop").unwrap();
    t.close();
    fs::remove_file(t.db_path()).unwrap();

    t.reopen();
    assert!(t.store().contains("keep"));
    assert!(!t.store().contains("drop"));
}

#[test]
fn recovery_is_idempotent_across_many_reopens() {
    let mut t = TestStore::new();
    for i in 0..10 {
        t.save(&format!("v{}", i), &[i as f64]);
    }
    for _ in 0..3 {
        t.reopen();
        assert_eq!(t.store().count(), 10);
    }
    assert!(!t.store().has_pending_wal());
}

#[test]
fn heterogeneous_dimensions_coexist() {
    let mut t = TestStore::new();
    t.save("two", &[1.0, 2.0]);
    t.save("three", &[1.0, 2.0, 3.0]);
    t.save("one", &[7.0]);
    t.reopen();

    let store = t.store();
    assert_eq!(store.get("two").unwrap().dimension(), 2);
    assert_eq!(store.get("three").unwrap().dimension(), 3);
    assert_eq!(store.get("one").unwrap().dimension(), 1);
}
