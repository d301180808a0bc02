//! Concurrency tests for the guarded deque

use super::*;
use crate::metrics::MetricsCollector;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_guarded_stress_conserves_elements() {
    let queue = Arc::new(SafeLinkedDeque::new());
    let num_threads = 8;
    let ops_per_thread = 5000;
    let barrier = Arc::new(Barrier::new(num_threads));
    let pushed = Arc::new(AtomicUsize::new(0));
    let popped = Arc::new(AtomicUsize::new(0));

    let mut handles = vec![];
    for thread_id in 0..num_threads {
        let queue = Arc::clone(&queue);
        let barrier = Arc::clone(&barrier);
        let pushed = Arc::clone(&pushed);
        let popped = Arc::clone(&popped);

        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..ops_per_thread {
                match (thread_id + i) % 4 {
                    0 => {
                        queue.push_back(i).unwrap();
                        pushed.fetch_add(1, Ordering::Relaxed);
                    }
                    1 => {
                        queue.push_front(i).unwrap();
                        pushed.fetch_add(1, Ordering::Relaxed);
                    }
                    2 => {
                        if queue.pop_front().unwrap().is_some() {
                            popped.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    _ => {
                        let n = queue.push_back_all([i, i + 1]).unwrap();
                        pushed.fetch_add(n, Ordering::Relaxed);
                        let items = queue.pop_front_many(3).unwrap();
                        popped.fetch_add(items.len(), Ordering::Relaxed);
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // Quiescent point: the length is exactly what went in minus what came out
    let pushed = pushed.load(Ordering::Relaxed);
    let popped = popped.load(Ordering::Relaxed);
    assert_eq!(queue.len(), pushed - popped);

    let rest = queue.pop_front_many(usize::MAX).unwrap();
    assert_eq!(rest.len(), pushed - popped);
    assert!(queue.is_empty());

    let metrics = queue.metrics();
    assert_eq!(metrics.invariant_violations, 0);
    assert_eq!(metrics.moved_elements as usize, pushed + popped + rest.len());
}

#[test]
fn test_producer_consumer_sum() {
    let queue = Arc::new(SafeLinkedDeque::new());
    let num_producers = 4;
    let num_consumers = 4;
    let items_per_producer = 10_000;
    let total = num_producers * items_per_producer;
    let consumed = Arc::new(AtomicUsize::new(0));

    let mut producer_handles = vec![];
    for producer_id in 0..num_producers {
        let queue = Arc::clone(&queue);
        producer_handles.push(thread::spawn(move || {
            for i in 0..items_per_producer {
                queue.push_back(producer_id * items_per_producer + i).unwrap();
            }
        }));
    }

    let mut consumer_handles = vec![];
    for _ in 0..num_consumers {
        let queue = Arc::clone(&queue);
        let consumed = Arc::clone(&consumed);
        consumer_handles.push(thread::spawn(move || {
            let mut sum = 0;
            while consumed.load(Ordering::Relaxed) < total {
                match queue.pop_front().unwrap() {
                    Some(value) => {
                        sum += value;
                        consumed.fetch_add(1, Ordering::Relaxed);
                    }
                    // Empty is not an error; pops never block
                    None => thread::yield_now(),
                }
            }
            sum
        }));
    }

    for handle in producer_handles {
        handle.join().unwrap();
    }

    let mut total_sum = 0;
    for handle in consumer_handles {
        total_sum += handle.join().unwrap();
    }

    assert_eq!(consumed.load(Ordering::Relaxed), total);
    assert_eq!(total_sum, total * (total - 1) / 2);
    assert!(queue.is_empty());
}

#[test]
fn test_per_producer_fifo_order() {
    let queue = Arc::new(SafeLinkedDeque::new());
    let num_threads = 4;
    let items_per_thread = 1000;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..items_per_thread {
                    queue.push_back((thread_id, i)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Interleaving across producers is arbitrary, but each producer's own
    // items come out in the order it pushed them
    let mut next_expected = vec![0; num_threads];
    let mut seen = HashSet::new();
    while let Some((thread_id, i)) = queue.pop_front().unwrap() {
        assert!(seen.insert((thread_id, i)), "Duplicate value: {:?}", (thread_id, i));
        assert_eq!(i, next_expected[thread_id]);
        next_expected[thread_id] += 1;
    }

    assert!(next_expected.iter().all(|&n| n == items_per_thread));
}

#[test]
fn test_bulk_push_is_contiguous() {
    let queue = Arc::new(SafeLinkedDeque::new());
    let num_threads = 4;
    let batches = 50;
    let batch_len = 10;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for batch in 0..batches {
                    let items = (0..batch_len).map(|i| (thread_id, batch, i));
                    assert_eq!(queue.push_back_all(items).unwrap(), batch_len);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // A batch is pushed under one lock hold, so it is never split
    let all = queue.pop_front_many(usize::MAX).unwrap();
    assert_eq!(all.len(), num_threads * batches * batch_len);
    for chunk in all.chunks(batch_len) {
        let (thread_id, batch, _) = chunk[0];
        for (i, &item) in chunk.iter().enumerate() {
            assert_eq!(item, (thread_id, batch, i));
        }
    }
}

#[test]
fn test_push_visible_after_barrier() {
    let queue = Arc::new(SafeLinkedDeque::new());
    let barrier = Arc::new(Barrier::new(2));

    let producer = {
        let queue = Arc::clone(&queue);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            queue.push_back(42).unwrap();
            barrier.wait();
        })
    };

    let consumer = {
        let queue = Arc::clone(&queue);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            queue.pop_front().unwrap()
        })
    };

    producer.join().unwrap();
    assert_eq!(consumer.join().unwrap(), Some(42));
    assert!(queue.is_empty());
}
