//! Concurrent pattern store access tests
//!
//! A categorization burst can confirm the same merchant from several
//! callers at once. Every confirmation must be counted exactly once.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use horizon_core::adapters::{InMemoryPatternStore, JsonPatternStore};
use horizon_core::config::CategorizationSettings;
use horizon_core::domain::{CategorizationSource, LearnOutcome};
use horizon_core::ports::PatternStore;
use horizon_core::services::CategorizationService;

/// Number of concurrent threads for stress tests
const THREAD_COUNT: usize = 8;

/// Number of confirmations per thread
const ITERATIONS_PER_THREAD: usize = 25;

/// Run `ITERATIONS_PER_THREAD` learns of one merchant from every thread
fn hammer(service: Arc<CategorizationService>, family_id: Uuid, category_id: Uuid, threads: usize) -> usize {
    let barrier = Arc::new(Barrier::new(threads));
    let learned = Arc::new(AtomicUsize::new(0));
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    let handles: Vec<_> = (0..threads)
        .map(|thread_id| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            let learned = Arc::clone(&learned);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..ITERATIONS_PER_THREAD {
                    // Store numbers differ per call but normalize away
                    let merchant = format!("STARBUCKS STORE #{}", thread_id * 100 + i);
                    let outcome = service
                        .learn(family_id, &merchant, category_id, CategorizationSource::User, at)
                        .unwrap();
                    if matches!(outcome, LearnOutcome::Learned { .. }) {
                        learned.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("learning thread panicked");
    }
    learned.load(Ordering::SeqCst)
}

#[test]
fn test_concurrent_learning_counts_every_match() {
    let store = Arc::new(InMemoryPatternStore::new());
    let service = Arc::new(CategorizationService::new(
        store.clone(),
        CategorizationSettings::default(),
    ));
    let family_id = Uuid::new_v4();
    let category_id = Uuid::new_v4();

    let learned = hammer(service, family_id, category_id, THREAD_COUNT);
    assert_eq!(learned, THREAD_COUNT * ITERATIONS_PER_THREAD);

    let patterns = store.patterns_for_family(family_id).unwrap();
    assert_eq!(patterns.len(), 1, "all variants should share one pattern");
    assert_eq!(patterns[0].merchant_normalized, "starbucks");
    assert_eq!(
        patterns[0].match_count as usize,
        THREAD_COUNT * ITERATIONS_PER_THREAD
    );
}

#[test]
fn test_concurrent_learning_through_json_store() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonPatternStore::in_dir(dir.path()));
    let service = Arc::new(CategorizationService::new(
        store.clone(),
        CategorizationSettings::default(),
    ));
    let family_id = Uuid::new_v4();
    let category_id = Uuid::new_v4();

    let threads = 4;
    let learned = hammer(service, family_id, category_id, threads);
    assert_eq!(learned, threads * ITERATIONS_PER_THREAD);

    // A fresh store sees the same total on disk
    let reopened = JsonPatternStore::in_dir(dir.path());
    let patterns = reopened.patterns_for_family(family_id).unwrap();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].match_count as usize, threads * ITERATIONS_PER_THREAD);
}

#[test]
fn test_readers_see_consistent_patterns_during_writes() {
    let store = Arc::new(InMemoryPatternStore::new());
    let service = Arc::new(CategorizationService::new(
        store.clone(),
        CategorizationSettings::default(),
    ));
    let family_id = Uuid::new_v4();
    let category_id = Uuid::new_v4();
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    service
        .learn(family_id, "Whole Foods Market", category_id, CategorizationSource::User, at)
        .unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let writer = {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..100 {
                service
                    .learn(family_id, "WHOLE FOODS MARKET #10", category_id, CategorizationSource::Rule, at)
                    .unwrap();
            }
        })
    };
    let reader = {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            let mut last_count = 0;
            for _ in 0..100 {
                let patterns = service.patterns(family_id).unwrap();
                assert_eq!(patterns.len(), 1);
                assert!(patterns[0].match_count >= last_count, "match count went backwards");
                last_count = patterns[0].match_count;

                let suggestions = service.suggest(family_id, "whole foods market").unwrap();
                assert_eq!(suggestions.len(), 1);
            }
        })
    };

    writer.join().expect("writer panicked");
    reader.join().expect("reader panicked");
    assert_eq!(store.patterns_for_family(family_id).unwrap()[0].match_count, 101);
}
