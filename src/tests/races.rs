//! Concurrent callers: claim mutual exclusion, ack/reclaim races.
//!
//! Races that can hang on a bug are wrapped in a timeout, so a regression
//! fails fast instead of wedging the suite.

use super::*;

use std::collections::HashSet;

use tokio::time::timeout;

const RACE_TIMEOUT: Duration = Duration::from_secs(10);

/// Test: two receivers against one ready message — exactly one wins
/// immediately, the other waits out its window and times out.
#[tokio::test(start_paused = true)]
async fn single_message_has_single_winner() {
    let queue = memory();
    queue.send(payload(1)).await.unwrap();

    let (a, b) = tokio::join!(queue.receive(30, 1), queue.receive(30, 1));

    let winners = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1);
    let timeouts = [a, b]
        .into_iter()
        .filter(|r| matches!(r, Err(QueueError::TimeoutExceeded)))
        .count();
    assert_eq!(timeouts, 1);
}

/// Test: many receivers draining a full queue never share a message and
/// never lose one.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_receivers_partition_the_queue() {
    let queue = Arc::new(memory());
    for n in 0..100 {
        queue.send(payload(n)).await.unwrap();
    }

    let drained = timeout(RACE_TIMEOUT, async {
        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                let mut got = Vec::new();
                loop {
                    match queue.receive(60, 0).await {
                        Ok((_, message)) => got.push(n_of(&message)),
                        Err(QueueError::TimeoutExceeded) => break,
                        Err(e) => panic!("unexpected receive error: {e}"),
                    }
                }
                got
            }));
        }
        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }
        all
    })
    .await
    .expect("drain deadlocked");

    let mut sorted = drained.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..100).collect::<Vec<i64>>());
}

/// Test: producers and consumers running together hand over every
/// message exactly once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn interleaved_send_receive_delivers_everything_once() {
    let queue = Arc::new(memory());

    let delivered = timeout(RACE_TIMEOUT, async {
        let mut producers = Vec::new();
        for p in 0..4i64 {
            let queue = Arc::clone(&queue);
            producers.push(tokio::spawn(async move {
                for n in 0..25 {
                    queue.send(payload(p * 25 + n)).await.unwrap();
                }
            }));
        }

        let mut consumers = Vec::new();
        for _ in 0..4 {
            let queue = Arc::clone(&queue);
            consumers.push(tokio::spawn(async move {
                let mut got = Vec::new();
                loop {
                    match queue.receive(60, 1).await {
                        Ok((receipt, message)) => {
                            got.push(n_of(&message));
                            queue.remove(&receipt).await.unwrap();
                        }
                        Err(QueueError::TimeoutExceeded) => break,
                        Err(e) => panic!("unexpected receive error: {e}"),
                    }
                }
                got
            }));
        }

        for handle in producers {
            handle.await.unwrap();
        }
        let mut all = Vec::new();
        for handle in consumers {
            all.extend(handle.await.unwrap());
        }
        all
    })
    .await
    .expect("interleaved run deadlocked");

    let distinct: HashSet<i64> = delivered.iter().copied().collect();
    assert_eq!(delivered.len(), 100, "duplicate or lost deliveries");
    assert_eq!(distinct.len(), 100);
}

/// Test: ten concurrent acknowledgers of one receipt — exactly one
/// succeeds, the rest observe a benign miss.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ack_has_single_winner() {
    let queue = Arc::new(memory());
    queue.send(payload(1)).await.unwrap();
    let (receipt, _) = queue.receive(30, 1).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let queue = Arc::clone(&queue);
        let receipt = receipt.clone();
        handles.push(tokio::spawn(async move {
            queue.remove_batch(vec![receipt]).await.is_empty()
        }));
    }

    let mut wins = 0;
    for handle in handles {
        if handle.await.unwrap() {
            wins += 1;
        }
    }
    assert_eq!(wins, 1, "acknowledge must transfer ownership exactly once");
}

/// Test: an expired lease contested by a late acknowledger and a
/// reclaiming receiver resolves to exactly one outcome — either the ack
/// lands and nothing is redelivered, or reclamation wins and the stale
/// ack reports failure.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn expired_lease_ack_reclaim_race_is_consistent() {
    let clock = manual_clock();
    let queue = Arc::new(memory_at(Arc::clone(&clock)));

    for round in 0..20 {
        queue.send(payload(round)).await.unwrap();
        let (receipt, _) = queue.receive(1, 1).await.unwrap();
        clock.advance(Duration::from_secs(2));

        let acker = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.remove_batch(vec![receipt]).await })
        };
        let receiver = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.receive(60, 0).await })
        };

        let failed = acker.await.unwrap();
        match receiver.await.unwrap() {
            Ok((fresh_receipt, _)) => {
                assert_eq!(failed.len(), 1, "round {round}: both ack and reclaim won");
                queue.remove(&fresh_receipt).await.unwrap();
            }
            Err(QueueError::TimeoutExceeded) => {
                assert!(failed.is_empty(), "round {round}: message vanished entirely");
            }
            Err(e) => panic!("round {round}: unexpected error: {e}"),
        }
    }
}
