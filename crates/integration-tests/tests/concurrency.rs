//! Concurrency Tests
//!
//! Parallel commands against one registry must never share an id or lose
//! an approval.

use reviewq_core::application::{CommandDispatcher, Invocation, LifecycleEngine, MentionStyle, QueueRegistry};
use reviewq_core::port::SystemTimeProvider;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinSet;

fn dispatcher() -> Arc<CommandDispatcher> {
    let engine = LifecycleEngine::new(
        Arc::new(QueueRegistry::new()),
        Arc::new(SystemTimeProvider),
        MentionStyle::Plain,
    );
    Arc::new(CommandDispatcher::new(Arc::new(engine)))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_get_distinct_ids() {
    const N: u64 = 64;
    let d = dispatcher();

    let mut set = JoinSet::new();
    for i in 0..N {
        let d = d.clone();
        set.spawn(async move {
            let text = format!("queue add T{} link{} bob", i, i);
            d.respond_to_command(&text, &Invocation::new("alice", "C1"))
        });
    }

    let mut replies = Vec::new();
    while let Some(res) = set.join_next().await {
        let reply = res.unwrap();
        assert!(reply.is_ok(), "{}", reply.text);
        replies.push(reply.text);
    }

    let ids: BTreeSet<u64> = (1..=N).filter(|id| d.engine().snapshot(*id).is_some()).collect();
    assert_eq!(ids.len() as u64, N);
    assert_eq!(d.engine().stats().total as u64, N);
    assert_eq!(replies.len() as u64, N);
}

#[test]
fn test_concurrent_adds_from_threads() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;
    let d = dispatcher();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let d = d.clone();
            std::thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|i| {
                        let text = format!("queue add T{}-{} link bob", t, i);
                        d.respond_to_command(&text, &Invocation::new("alice", "C1"))
                            .text
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        for text in handle.join().unwrap() {
            let id: u64 = text
                .trim_start_matches("Queue added (ID: ")
                .split(')')
                .next()
                .unwrap()
                .parse()
                .unwrap();
            assert!(ids.insert(id), "duplicate id {}", id);
        }
    }

    let expected: BTreeSet<u64> = (1..=(THREADS * PER_THREAD) as u64).collect();
    assert_eq!(ids, expected);
}

/// Every tagged reviewer approves at once; each tag goes exactly once
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approvals_clear_all_tags() {
    let d = dispatcher();
    let reviewers: Vec<String> = (0..16).map(|i| format!("r{}", i)).collect();
    let reply = d.respond_to_command(
        &format!("queue add Big link {}", reviewers.join(" ")),
        &Invocation::new("alice", "C1"),
    );
    assert!(reply.is_ok());

    let mut set = JoinSet::new();
    for reviewer in reviewers {
        let d = d.clone();
        set.spawn(async move { d.respond_to_command("queue approve 1", &Invocation::new(reviewer, "C1")) });
    }

    let mut cleared = 0;
    while let Some(res) = set.join_next().await {
        let reply = res.unwrap();
        assert!(reply.is_ok(), "{}", reply.text);
        if reply.text.contains("All tags cleared") {
            cleared += 1;
        }
    }

    assert_eq!(cleared, 1);
    assert!(d.engine().snapshot(1).unwrap().tags.is_empty());
}
