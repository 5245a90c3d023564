use crate::bptree::BPlusTreeMap;
use proptest::collection::btree_set as pset;
use proptest::collection::vec as pvec;
use proptest::prelude::*;
use std::collections::{BTreeMap as StdBTreeMap, BTreeSet};
use test_strategy::proptest;

#[derive(Debug, Clone)]
enum Operation {
    Insert { key: u16, value: u8 },
    Get(u16),
    Iter { from: usize, len: usize },
    Range { low: u16, high: u16 },
    FirstLast,
    Clear,
}

// A custom strategy that gives unequal weights to the different operations.
// `Insert` leads so that, on average, maps grow the more operations are
// executed, and `Clear` is rare enough for trees to get deep between resets.
fn op_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        8 => (any::<u16>(), any::<u8>())
            .prop_map(|(key, value)| Operation::Insert { key, value }),
        3 => (any::<u16>()).prop_map(Operation::Get),
        2 => (any::<usize>(), any::<usize>())
            .prop_map(|(from, len)| Operation::Iter { from, len }),
        2 => (any::<u16>(), any::<u16>())
            .prop_map(|(low, high)| Operation::Range { low, high }),
        1 => Just(Operation::FirstLast),
        1 => Just(Operation::Clear),
    ]
}

// Runs a comprehensive test for the major map operations across a spread of
// node capacities. Results are validated against a standard BTreeMap keeping
// every key's values in insertion order.
#[proptest(cases = 10)]
fn comprehensive(
    #[strategy(pvec(op_strategy(), 100..5_000))] ops: Vec<Operation>,
    #[strategy(3usize..8)] order: usize,
    #[strategy(1usize..5)] leaf_order: usize,
) {
    let mut map = BPlusTreeMap::with_orders(order, leaf_order);
    let mut model = StdBTreeMap::new();

    // Execute all the operations, validating that the map behaves like the
    // model.
    for op in ops.into_iter() {
        execute_operation(&mut model, &mut map, op);
    }
}

// A comprehensive fuzz test that runs until it's explicitly terminated. To
// run:
//
// ```
// cargo t comprehensive_fuzz -- --ignored --nocapture 2> comprehensive_fuzz.log
// ```
//
// comprehensive_fuzz.log contains all the operations to help triage a
// failure.
#[test]
#[ignore]
fn comprehensive_fuzz() {
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;
    let mut runner = TestRunner::default();

    let mut map = BPlusTreeMap::with_orders(4, 2);
    let mut model = StdBTreeMap::new();

    let mut i = 0;

    loop {
        let op = op_strategy().new_tree(&mut runner).unwrap().current();
        execute_operation(&mut model, &mut map, op);
        i += 1;
        if i % 1000 == 0 {
            println!("=== Step {i} ===");
            println!("=== Map size: {}", map.len());
        }
    }
}

#[proptest]
fn map_min_max(#[strategy(pvec(any::<u64>(), 10..100))] keys: Vec<u64>) {
    let mut map = BPlusTreeMap::with_orders(3, 1);
    prop_assert_eq!(map.first_key(), None);
    prop_assert_eq!(map.last_key(), None);

    for (n, key) in keys.iter().enumerate() {
        map.insert(*key, *key);

        let min = keys[0..=n].iter().min().unwrap();
        let max = keys[0..=n].iter().max().unwrap();

        prop_assert_eq!(map.first_key(), Some(min));
        prop_assert_eq!(map.last_key(), Some(max));
    }
}

#[proptest]
fn values_accumulate_in_insertion_order(
    #[strategy(pvec(any::<u8>(), 1..50))] values: Vec<u8>,
    key: u16,
) {
    let mut map = BPlusTreeMap::with_orders(3, 2);
    for value in values.iter() {
        map.insert(key, *value);
    }

    prop_assert_eq!(map.len(), 1);
    prop_assert_eq!(map.get(&key), Some(values.as_slice()));
}

#[proptest]
fn sub_map_matches_model_range(
    #[strategy(pset(any::<u16>(), 1..200))] keys: BTreeSet<u16>,
    low: u16,
    high: u16,
) {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    let mut map = BPlusTreeMap::with_orders(4, 3);
    for key in keys.iter() {
        map.insert(*key, ());
    }

    let expected: Vec<u16> = keys.range(low..high).copied().collect();
    let view = map.sub_map(low, high);
    let actual: Vec<u16> = view.entries(&map).map(|(key, _)| *key).collect();
    prop_assert_eq!(actual, expected);
}

fn execute_operation(
    model: &mut StdBTreeMap<u16, Vec<u8>>,
    map: &mut BPlusTreeMap<u16, u8>,
    op: Operation,
) {
    match op {
        Operation::Insert { key, value } => {
            eprintln!("Insert({key}, {value})");
            let newly_inserted = map.insert(key, value);
            assert_eq!(newly_inserted, !model.contains_key(&key));
            model.entry(key).or_default().push(value);
            assert_eq!(map.len(), model.len());
        }
        Operation::Get(key) => {
            eprintln!("Get({key})");
            assert_eq!(
                map.get(&key),
                model.get(&key).map(|values| values.as_slice())
            );
            assert_eq!(map.contains_key(&key), model.contains_key(&key));
        }
        Operation::Iter { from, len } => {
            if model.is_empty() {
                return;
            }
            let from = from % model.len();
            let len = len % model.len();

            eprintln!("Iter({from}, {len})");
            let model_iter = model.iter().skip(from).take(len);
            let map_iter = map.iter().skip(from).take(len);
            for ((model_key, model_values), (key, values)) in model_iter.zip(map_iter) {
                assert_eq!(model_key, key);
                assert_eq!(model_values.as_slice(), values);
            }
        }
        Operation::Range { low, high } => {
            let (low, high) = if low <= high { (low, high) } else { (high, low) };
            eprintln!("Range({low}, {high})");

            let view = map.sub_map(low, high);
            let expected: Vec<(u16, Vec<u8>)> = model
                .range(low..high)
                .map(|(key, values)| (*key, values.clone()))
                .collect();
            let actual: Vec<(u16, Vec<u8>)> = view
                .entries(map)
                .map(|(key, values)| (*key, values.to_vec()))
                .collect();
            assert_eq!(actual, expected);
            assert_eq!(view.len(map), expected.len());
        }
        Operation::FirstLast => {
            eprintln!("FirstLast");
            assert_eq!(map.first_key(), model.keys().next());
            assert_eq!(map.last_key(), model.keys().next_back());
        }
        Operation::Clear => {
            eprintln!("Clear");
            map.clear();
            model.clear();
            assert!(map.is_empty());
        }
    };
}
