//! Concurrency tests for the sequencer
//!
//! Many proposers race on one document; the log must stay a gap-free,
//! duplicate-free total order and readers must never see a torn state.
//!
//! Run with:
//!   cargo test --test concurrent_sequencer

use std::collections::HashSet;
use std::sync::Arc;

use docseq::{Changelog, ChangelogError, DocumentRegistry, Proposal, Sequencer, StaticResolver};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn proposal(clock: u64, caller: &str) -> Proposal {
    Proposal::new(caller.as_bytes().to_vec(), clock, 1, "sess", caller)
}

fn assert_gap_free(seq: &Sequencer, expected: u64) {
    let (clock, entries) = seq.snapshot().unwrap();
    assert_eq!(clock, expected);
    assert_eq!(entries.len() as u64, expected);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.accepted_clock, i as u64);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn two_racing_acceptances_get_distinct_clocks() {
    let seq = Arc::new(Sequencer::default());
    let before = seq.current_clock().unwrap();

    let a = {
        let seq = Arc::clone(&seq);
        tokio::spawn(async move { seq.accept_proposal(proposal(0, "a"), "alice".into()) })
    };
    let b = {
        let seq = Arc::clone(&seq);
        tokio::spawn(async move { seq.accept_proposal(proposal(0, "b"), "bob".into()) })
    };

    let a = a.await.unwrap().unwrap();
    let b = b.await.unwrap().unwrap();

    assert_ne!(a.accepted_clock, b.accepted_clock);
    assert_eq!(seq.current_clock().unwrap(), before + 2);
    assert_gap_free(&seq, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_proposers_produce_total_order() {
    let seq = Arc::new(Sequencer::default());
    let workers = 8;
    let per_worker = 50;

    let mut handles = Vec::new();
    for w in 0..workers {
        let seq = Arc::clone(&seq);
        handles.push(tokio::spawn(async move {
            let caller = format!("user-{}", w);
            let mut clocks = Vec::new();
            for _ in 0..per_worker {
                // Propose against whatever this client last observed
                let observed = seq.current_clock().unwrap();
                let accepted = seq
                    .accept_proposal(proposal(observed, &caller), caller.as_str().into())
                    .unwrap();
                clocks.push(accepted.accepted_clock);
                tokio::task::yield_now().await;
            }
            clocks
        }));
    }

    let mut all = HashSet::new();
    for handle in handles {
        for clock in handle.await.unwrap() {
            assert!(all.insert(clock), "clock {} assigned twice", clock);
        }
    }

    let total = (workers * per_worker) as u64;
    assert_eq!(all.len() as u64, total);
    assert_gap_free(&seq, total);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_observe_torn_state() {
    let seq = Arc::new(Sequencer::default());
    let writes = 500u64;

    let writer = {
        let seq = Arc::clone(&seq);
        tokio::spawn(async move {
            for _ in 0..writes {
                seq.accept_proposal(proposal(0, "w"), "writer".into()).unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let reader = {
        let seq = Arc::clone(&seq);
        tokio::spawn(async move {
            let mut last = 0;
            while last < writes {
                let (clock, entries) = seq.snapshot().unwrap();
                assert_eq!(entries.len() as u64, clock);
                assert!(clock >= last);
                if let Some(tail) = entries.last() {
                    assert_eq!(tail.accepted_clock, clock - 1);
                }
                last = clock;
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
    assert_gap_free(&seq, writes);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fan_out_follows_clock_order() {
    let seq = Arc::new(Sequencer::default());
    let mut rx = seq.subscribe();

    let mut handles = Vec::new();
    for w in 0..4 {
        let seq = Arc::clone(&seq);
        handles.push(tokio::spawn(async move {
            for _ in 0..25 {
                seq.accept_proposal(proposal(0, "f"), format!("user-{}", w).into())
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for expected in 0..100u64 {
        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.accepted_clock, expected);
    }
}

#[tokio::test]
async fn future_clock_rejection_leaves_log_untouched() {
    let seq = Sequencer::default();
    for clock in 0..3 {
        seq.accept_proposal(proposal(clock, "a"), "alice".into()).unwrap();
    }
    let before = seq.suffix_from(0).unwrap();

    let err = seq.accept_proposal(proposal(4, "a"), "alice".into()).unwrap_err();
    assert!(matches!(err, ChangelogError::InvalidClock { proposed: 4, log_clock: 3 }));
    assert_eq!(seq.suffix_from(0).unwrap(), before);
}

#[tokio::test]
async fn catch_up_after_reconnect() {
    let registry = DocumentRegistry::default();
    let doc = Uuid::new_v4();
    let resolver = StaticResolver::new().with_session("sess", "alice");

    let seq = registry.open(doc).await;
    for clock in 0..5 {
        seq.submit(proposal(clock, "a"), &resolver).await.unwrap();
    }

    // A client that last saw clock 3 only needs the tail
    let missed = registry.open(doc).await.suffix_from(3).unwrap();
    assert_eq!(
        missed.iter().map(|e| e.accepted_clock).collect::<Vec<_>>(),
        vec![3, 4]
    );
    assert!(missed.iter().all(|e| e.user_id.as_str() == "alice"));

    let json = serde_json::to_string(&missed).unwrap();
    assert!(!json.contains("sess"));
}

#[test]
fn stored_entries_never_reveal_session_outside_the_crate() {
    let mut log = Changelog::new();
    let secret = Proposal::new(b"edit".to_vec(), 0, 1, "top-secret", "caller");
    log.accept_proposal(secret, "alice".into()).unwrap();

    let stored = log.get(0).unwrap();
    assert_eq!(stored.user_id().as_str(), "alice");
    assert!(!format!("{:?}", stored).contains("top-secret"));

    let public = serde_json::to_string(&log.suffix_from(0).unwrap()).unwrap();
    assert!(!public.contains("top-secret"));
}
