//! Concurrency tests for the per-name lock table.
//!
//! - Concurrent encrypts on one name never reuse an iteration
//! - Separate sessions over one store still serialize per name
//! - A message decrypted concurrently succeeds exactly once
//! - Different names progress independently

mod common;

use std::{
    collections::BTreeSet,
    sync::{Arc, Barrier},
    thread,
};

use chorus_core::{GroupError, GroupSessions, MemoryStore, SenderKeyStore};
use chorus_proto::SenderKeyMessage;
use common::{SeededEnv, alice, alice_in, connect, device};

const THREADS: usize = 8;
const PER_THREAD: usize = 50;

#[test]
fn concurrent_encrypts_never_reuse_iteration() {
    let sender = device(1);
    let receiver = device(2);
    let pair = connect(&sender, &receiver, &alice());

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cipher = pair.sender.clone();
            thread::spawn(move || {
                (0..PER_THREAD).map(|_| cipher.encrypt(b"concurrent").unwrap()).collect::<Vec<_>>()
            })
        })
        .collect();

    let ciphertexts: Vec<Vec<u8>> =
        handles.into_iter().flat_map(|handle| handle.join().unwrap()).collect();

    let iterations: BTreeSet<u32> = ciphertexts
        .iter()
        .map(|bytes| SenderKeyMessage::parse(bytes).unwrap().iteration())
        .collect();
    let expected: BTreeSet<u32> = (0..(THREADS * PER_THREAD) as u32).collect();
    assert_eq!(iterations, expected);

    for ciphertext in &ciphertexts {
        assert_eq!(pair.receiver.decrypt(ciphertext).unwrap(), b"concurrent");
    }
}

#[test]
fn sessions_sharing_a_store_never_reuse_iteration() {
    const ENCRYPTS: usize = 500;

    let store = MemoryStore::new();
    let first = GroupSessions::new(store.clone(), SeededEnv::new(1));
    let second = GroupSessions::new(store, SeededEnv::new(2));
    first.builder().create(&alice()).unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [first.cipher(alice()), second.cipher(alice())]
        .into_iter()
        .map(|cipher| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..ENCRYPTS).map(|_| cipher.encrypt(b"shared store").unwrap()).collect::<Vec<_>>()
            })
        })
        .collect();

    let iterations: Vec<u32> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .map(|bytes| SenderKeyMessage::parse(&bytes).unwrap().iteration())
        .collect();
    let distinct: BTreeSet<u32> = iterations.iter().copied().collect();

    assert_eq!(distinct.len(), iterations.len(), "message key reused");
    assert_eq!(distinct, (0..(2 * ENCRYPTS) as u32).collect());
}

#[test]
fn concurrent_decrypts_of_one_message_succeed_once() {
    let pair = Arc::new(common::memory_pair());
    let ciphertext = Arc::new(pair.sender.encrypt(b"exactly once").unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let pair = Arc::clone(&pair);
            let ciphertext = Arc::clone(&ciphertext);
            thread::spawn(move || pair.receiver.decrypt(&ciphertext))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

    let successes = results.iter().filter(|result| result.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|result| matches!(result, Err(GroupError::DuplicateMessage { .. })))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(duplicates, THREADS - 1);
}

#[test]
fn independent_names_progress_in_parallel() {
    let sender = device(1);
    let receiver = device(2);

    let pairs: Vec<_> = (0..THREADS)
        .map(|i| connect(&sender, &receiver, &alice_in(&format!("group-{i}"))))
        .collect();

    thread::scope(|scope| {
        for pair in &pairs {
            scope.spawn(move || {
                for i in 0..PER_THREAD {
                    let ciphertext = pair.sender.encrypt(&[i as u8]).unwrap();
                    assert_eq!(pair.receiver.decrypt(&ciphertext).unwrap(), [i as u8]);
                }
            });
        }
    });

    for i in 0..THREADS {
        let record = sender.store().load_sender_key(&alice_in(&format!("group-{i}"))).unwrap();
        assert_eq!(record.newest().unwrap().chain_key().iteration(), PER_THREAD as u32);
    }
}
