use std::sync::Arc;
use std::thread;

use warden_core::{EdgeKind, Entity, EntityKind, Grant, ObjectId, Storage};
use warden_store::InMemoryStorage;

#[test]
fn concurrent_duplicate_edges_are_stored_once() {
    let store = Arc::new(InMemoryStorage::new());
    let member = ObjectId::new();
    let groups: Vec<ObjectId> = (0..8).map(|_| ObjectId::new()).collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let groups = groups.clone();
            thread::spawn(move || {
                for group in groups {
                    store.insert_edge(EdgeKind::Membership, member, group).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stored = store.query_edges(EdgeKind::Membership, &member).unwrap();
    assert_eq!(stored.len(), groups.len());
    for group in &groups {
        assert_eq!(
            store.query_edges_to(EdgeKind::Membership, group).unwrap(),
            vec![member]
        );
    }
}

#[test]
fn concurrent_duplicate_grants_are_stored_once() {
    let store = Arc::new(InMemoryStorage::new());
    let subject = ObjectId::new();
    let object = ObjectId::new();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store
                    .insert_triple(Grant::new(subject, "edit", object))
                    .unwrap()
            })
        })
        .collect();

    let inserted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|inserted| *inserted)
        .count();

    assert_eq!(inserted, 1);
    assert_eq!(store.query_triples(&subject).unwrap().len(), 1);
}

#[test]
fn readers_run_alongside_writers() {
    let store = Arc::new(InMemoryStorage::new());
    let group = store
        .insert_row(Entity::new(ObjectId::new(), EntityKind::Group).with_key("readers"))
        .unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..100 {
                let id = store
                    .insert_row(
                        Entity::new(ObjectId::new(), EntityKind::Identity)
                            .with_key(format!("user{}@example.com", i)),
                    )
                    .unwrap();
                store.insert_edge(EdgeKind::Membership, id, group).unwrap();
            }
        })
    };

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            let mut last = 0;
            for _ in 0..100 {
                let seen = store.query_edges_to(EdgeKind::Membership, &group).unwrap().len();
                assert!(seen >= last);
                last = seen;
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();

    assert_eq!(store.list_rows(EntityKind::Identity).unwrap().len(), 100);
    assert_eq!(
        store.query_edges_to(EdgeKind::Membership, &group).unwrap().len(),
        100
    );
}

#[test]
fn interleaved_insert_and_remove_keep_both_indexes_in_step() {
    let store = Arc::new(InMemoryStorage::new());
    let nodes: Vec<ObjectId> = (0..6).map(|_| ObjectId::new()).collect();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            let nodes = nodes.clone();
            thread::spawn(move || {
                for round in 0..500 {
                    let from = nodes[round % nodes.len()];
                    let to = nodes[(round / nodes.len() + worker) % nodes.len()];
                    if (round + worker) % 2 == 0 {
                        store.insert_edge(EdgeKind::Membership, from, to).unwrap();
                    } else {
                        store.remove_edge(EdgeKind::Membership, &from, &to).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for from in &nodes {
        let outgoing = store.query_edges(EdgeKind::Membership, from).unwrap();
        for to in &nodes {
            let incoming = store.query_edges_to(EdgeKind::Membership, to).unwrap();
            assert_eq!(
                outgoing.contains(to),
                incoming.contains(from),
                "indexes disagree on {} -> {}",
                from,
                to
            );
        }
    }
    assert_eq!(
        store.edge_count(EdgeKind::Membership),
        nodes
            .iter()
            .map(|to| store.query_edges_to(EdgeKind::Membership, to).unwrap().len())
            .sum::<usize>()
    );
}
