use std::sync::Arc;
use std::thread;

use netpack::{pack, unpack, Composite, DescriptorCache, Packet};

#[derive(Packet, Debug, Default, Clone, PartialEq)]
struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Packet, Debug, Default, Clone, PartialEq)]
struct Snapshot {
    pub tick: u64,
    pub positions: Vec<Position>,
}

#[test]
fn test_empty_cache() {
    let cache = DescriptorCache::new();
    assert!(cache.is_empty());
    assert!(!cache.contains::<Position>());
    assert!(cache.get::<Position>().is_none());
}

#[test]
fn test_get_or_describe_populates_once() {
    let cache = DescriptorCache::new();
    let first = cache.get_or_describe::<Position>();
    let second = cache.get_or_describe::<Position>();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(cache.contains::<Position>());
    assert_eq!(cache.len(), 1);

    cache.get_or_describe::<Snapshot>();
    assert_eq!(cache.len(), 2);
    let found = cache.get::<Snapshot>().unwrap();
    assert_eq!(found.members().len(), 2);
}

#[test]
fn test_concurrent_population_yields_one_descriptor() {
    let cache = DescriptorCache::new();
    let descriptors: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| cache.get_or_describe::<Snapshot>()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for descriptor in &descriptors {
        assert!(Arc::ptr_eq(descriptor, &descriptors[0]));
    }
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_concurrent_encoding() {
    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8u64)
            .map(|tick| {
                scope.spawn(move || {
                    let snapshot = Snapshot {
                        tick,
                        positions: vec![Position {
                            x: tick as f32,
                            y: -(tick as f32),
                        }],
                    };
                    let mut bytes = pack(&snapshot).unwrap();
                    let decoded: Snapshot = unpack(&mut bytes).unwrap();
                    (snapshot, decoded)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for (snapshot, decoded) in results {
        assert_eq!(snapshot, decoded);
    }
    assert!(Arc::ptr_eq(&Snapshot::descriptor(), &Snapshot::descriptor()));
    assert!(DescriptorCache::global().contains::<Snapshot>());
}
