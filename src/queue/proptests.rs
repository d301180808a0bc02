//! Property-based tests for the linked deque using proptest
//!
//! The unguarded deque is checked against `VecDeque` as a reference model,
//! and the guarded deque against a conservation law under real threads.

use crate::queue::{LinkedDeque, SafeLinkedDeque};
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
enum Op {
    PushBack(i32),
    PushFront(i32),
    PushBackAll(Vec<i32>),
    PushFrontAll(Vec<i32>),
    PopFront,
    PopFrontMany(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i32>().prop_map(Op::PushBack),
        3 => any::<i32>().prop_map(Op::PushFront),
        1 => prop::collection::vec(any::<i32>(), 0..8).prop_map(Op::PushBackAll),
        1 => prop::collection::vec(any::<i32>(), 0..8).prop_map(Op::PushFrontAll),
        3 => Just(Op::PopFront),
        1 => (0usize..12).prop_map(Op::PopFrontMany),
    ]
}

/// Property: the deque behaves exactly like a `VecDeque` used the same way
#[cfg(test)]
mod model_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_matches_reference_model(
            ops in prop::collection::vec(op_strategy(), 0..200)
        ) {
            let mut deque = LinkedDeque::new();
            let mut model = VecDeque::new();

            for op in ops {
                match op {
                    Op::PushBack(value) => {
                        prop_assert!(deque.push_back(value).is_ok());
                        model.push_back(value);
                    }
                    Op::PushFront(value) => {
                        prop_assert!(deque.push_front(value).is_ok());
                        model.push_front(value);
                    }
                    Op::PushBackAll(values) => {
                        prop_assert_eq!(deque.push_back_all(values.clone()), Ok(values.len()));
                        model.extend(values);
                    }
                    Op::PushFrontAll(values) => {
                        prop_assert_eq!(deque.push_front_all(values.clone()), Ok(values.len()));
                        for value in values {
                            model.push_front(value);
                        }
                    }
                    Op::PopFront => {
                        prop_assert_eq!(deque.pop_front(), Ok(model.pop_front()));
                    }
                    Op::PopFrontMany(count) => {
                        let take = count.min(model.len());
                        let expected: Vec<_> = model.drain(..take).collect();
                        prop_assert_eq!(deque.pop_front_many(count), Ok(expected));
                    }
                }

                prop_assert_eq!(deque.len(), model.len());
                prop_assert_eq!(deque.front(), model.front());
                prop_assert_eq!(deque.back(), model.back());
            }

            deque.assert_consistent();
            prop_assert!(deque.iter().eq(model.iter()));
        }

        #[test]
        fn test_fifo_round_trip(values in prop::collection::vec(any::<i32>(), 0..100)) {
            let mut deque = LinkedDeque::new();
            for &value in &values {
                deque.push_back(value).unwrap();
            }
            prop_assert_eq!(deque.len(), values.len());

            let mut drained = Vec::new();
            while let Some(value) = deque.pop_front().unwrap() {
                drained.push(value);
            }
            prop_assert_eq!(drained, values);
            deque.assert_consistent();
        }

        #[test]
        fn test_push_front_reverses(values in prop::collection::vec(any::<i32>(), 0..100)) {
            let mut deque = LinkedDeque::new();
            for &value in &values {
                deque.push_front(value).unwrap();
            }

            let drained = deque.pop_front_many(values.len()).unwrap();
            let expected: Vec<_> = values.iter().rev().copied().collect();
            prop_assert_eq!(drained, expected);
        }

        #[test]
        fn test_pop_many_never_overshoots(
            len in 0usize..50,
            count in 0usize..100
        ) {
            let mut deque: LinkedDeque<_> = (0..len).collect();
            let popped = deque.pop_front_many(count).unwrap();

            prop_assert_eq!(popped.len(), count.min(len));
            prop_assert_eq!(deque.len(), len - popped.len());
            prop_assert!(popped.iter().copied().eq(0..popped.len()));
            deque.assert_consistent();
        }
    }
}

/// Property: concurrent guarded operations neither lose nor duplicate elements
#[cfg(test)]
mod concurrent_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_concurrent_conservation(
            num_threads in 2usize..6,
            operations_per_thread in 10usize..200
        ) {
            let queue = Arc::new(SafeLinkedDeque::<usize>::new());
            let mut handles = vec![];

            for thread_id in 0..num_threads {
                let queue = Arc::clone(&queue);
                handles.push(thread::spawn(move || {
                    let mut received = Vec::new();
                    for i in 0..operations_per_thread {
                        let value = thread_id * operations_per_thread + i;
                        if i % 2 == 0 {
                            queue.push_back(value).unwrap();
                        } else {
                            queue.push_front(value).unwrap();
                        }
                        if i % 3 == 0 {
                            if let Some(value) = queue.pop_front().unwrap() {
                                received.push(value);
                            }
                        }
                    }
                    received
                }));
            }

            let mut all_received = Vec::new();
            for handle in handles {
                all_received.extend(handle.join().unwrap());
            }
            all_received.extend(queue.pop_front_many(usize::MAX).unwrap());

            // Every value sent is received exactly once
            let expected_total = num_threads * operations_per_thread;
            all_received.sort_unstable();
            prop_assert_eq!(all_received, (0..expected_total).collect::<Vec<_>>());
            prop_assert!(queue.is_empty());
        }
    }
}
