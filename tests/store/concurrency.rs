//! Concurrency Tests
//!
//! Writers are serialized by the store; readers run alongside them.

use crate::common::*;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn concurrent_writers_all_land() {
    let mut t = TestStore::new();
    let store = Arc::new(t.store.take().unwrap());
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|w| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..20 {
                    store
                        .save(record(&format!("w{}-{}", w, i), &[w as f64, i as f64]))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(store.count(), 80);

    drop(store);
    t.reopen();
    assert_eq!(t.store().count(), 80);
}

#[test]
fn readers_see_whole_records_during_writes() {
    let mut t = TestStore::new();
    t.save("shared", &[0.0, 0.0, 0.0]);
    let store = Arc::new(t.store.take().unwrap());

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 1..=50 {
                let v = i as f64;
                store.save(record("shared", &[v, v, v])).unwrap();
            }
        })
    };
    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..200 {
                let got = store.get("shared").unwrap();
                let values = got.values();
                assert!(values.iter().all(|x| *x == values[0]));
            }
        })
    };
    writer.join().unwrap();
    reader.join().unwrap();

    assert_eq!(store.get("shared").unwrap().values(), &[50.0, 50.0, 50.0]);
}
