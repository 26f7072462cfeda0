use proptest::prelude::*;
use std::collections::HashSet;
use taxis_core::model::MAX_PAYLOAD_CHARS;
use taxis_core::{
    Backend, GroupKey, ItemId, MemoryBackend, MoveOutcome, NewItem, OrderedItemStore,
    SqliteBackend, WriteError,
};

const GROUPS: [GroupKey; 3] = [0, 5, 6];

#[derive(Debug, Clone)]
enum Op {
    Insert { group: GroupKey, oversized: bool },
    Up { pick: usize, group: GroupKey },
    Down { pick: usize, group: GroupKey },
    Delete { pick: usize },
}

fn arb_group() -> impl Strategy<Value = GroupKey> {
    prop::sample::select(GROUPS.to_vec())
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (arb_group(), prop::bool::weighted(0.15))
            .prop_map(|(group, oversized)| Op::Insert { group, oversized }),
        2 => (any::<usize>(), arb_group()).prop_map(|(pick, group)| Op::Up { pick, group }),
        2 => (any::<usize>(), arb_group()).prop_map(|(pick, group)| Op::Down { pick, group }),
        1 => any::<usize>().prop_map(|pick| Op::Delete { pick }),
    ]
}

/// Resolve `pick` against the ids inserted so far; an out-of-range pick
/// yields an id the store never issued.
fn pick_id(ids: &[ItemId], pick: usize) -> ItemId {
    ids.get(pick % (ids.len() + 1)).copied().unwrap_or(10_000)
}

fn apply<B: Backend>(store: &mut OrderedItemStore<B>, ids: &mut Vec<ItemId>, op: &Op) -> String
where
    B::Error: std::fmt::Debug,
{
    match *op {
        Op::Insert { group, oversized } => {
            let label = if oversized {
                "x".repeat(MAX_PAYLOAD_CHARS + 1)
            } else {
                format!("item-{}", ids.len())
            };
            match store.insert(&NewItem::new(1, label, ""), group) {
                Ok(id) => {
                    ids.push(id);
                    format!("insert {id}")
                }
                Err(WriteError::Payload(err)) => format!("rejected: {err}"),
                Err(err) => panic!("insert failed: {err:?}"),
            }
        }
        Op::Up { pick, group } => {
            let outcome = store.move_up(pick_id(ids, pick), group).expect("move up");
            outcome.label().to_string()
        }
        Op::Down { pick, group } => {
            let outcome = store
                .move_down(pick_id(ids, pick), group)
                .expect("move down");
            outcome.label().to_string()
        }
        Op::Delete { pick } => {
            let removed = store.delete(pick_id(ids, pick)).expect("delete");
            format!("delete {removed}")
        }
    }
}

fn snapshot<B: Backend>(store: &OrderedItemStore<B>) -> Vec<Vec<(ItemId, i64)>>
where
    B::Error: std::fmt::Debug,
{
    GROUPS
        .iter()
        .map(|group| {
            store
                .list(*group)
                .expect("list")
                .into_iter()
                .map(|item| (item.id, item.taxis))
                .collect()
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn taxis_stays_distinct_within_each_group(ops in prop::collection::vec(arb_op(), 0..60)) {
        let mut store = OrderedItemStore::new(MemoryBackend::new());
        let mut ids = Vec::new();
        for op in &ops {
            apply(&mut store, &mut ids, op);
        }

        for group in GROUPS {
            let items = store.list(group).expect("list");
            let distinct: HashSet<i64> = items.iter().map(|item| item.taxis).collect();
            prop_assert_eq!(distinct.len(), items.len());
            prop_assert!(items.windows(2).all(|pair| pair[0].taxis < pair[1].taxis));
            prop_assert!(items.iter().all(|item| item.parent_id == group));
        }
    }

    #[test]
    fn inserts_alone_number_items_by_rank(groups in prop::collection::vec(arb_group(), 1..40)) {
        let mut store = OrderedItemStore::new(MemoryBackend::new());
        let mut inserted: Vec<(GroupKey, ItemId)> = Vec::new();
        for group in &groups {
            let id = store.insert(&NewItem::new(1, "x", ""), *group).expect("insert");
            inserted.push((*group, id));
        }

        for group in GROUPS {
            let expected: Vec<ItemId> = inserted
                .iter()
                .filter(|(g, _)| *g == group)
                .map(|(_, id)| *id)
                .collect();
            let items = store.list(group).expect("list");
            let ids: Vec<ItemId> = items.iter().map(|item| item.id).collect();
            prop_assert_eq!(ids, expected);
            for (rank, item) in items.iter().enumerate() {
                prop_assert_eq!(item.taxis, i64::try_from(rank).expect("rank fits") + 1);
            }
        }
    }

    #[test]
    fn up_then_down_restores_order(len in 2_usize..12, pick in any::<usize>()) {
        let mut store = OrderedItemStore::new(MemoryBackend::new());
        let ids: Vec<ItemId> = (0..len)
            .map(|n| store.insert(&NewItem::new(1, format!("n{n}"), ""), 5).expect("insert"))
            .collect();
        // any item but the last has a successor
        let target = ids[pick % (len - 1)];
        let before = snapshot(&store);

        prop_assert!(store.move_up(target, 5).expect("up").is_swapped());
        prop_assert!(store.move_down(target, 5).expect("down").is_swapped());
        prop_assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn delete_preserves_relative_order(len in 1_usize..15, pick in any::<usize>()) {
        let mut store = OrderedItemStore::new(MemoryBackend::new());
        let ids: Vec<ItemId> = (0..len)
            .map(|n| store.insert(&NewItem::new(1, format!("n{n}"), ""), 5).expect("insert"))
            .collect();
        let victim = ids[pick % len];

        prop_assert!(store.delete(victim).expect("delete"));

        let remaining: Vec<ItemId> = store.list(5).expect("list").into_iter().map(|i| i.id).collect();
        let expected: Vec<ItemId> = ids.into_iter().filter(|id| *id != victim).collect();
        prop_assert_eq!(remaining, expected);
    }

    #[test]
    fn sqlite_and_memory_backends_agree(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut memory = OrderedItemStore::new(MemoryBackend::new());
        let mut sqlite = OrderedItemStore::new(SqliteBackend::open_in_memory().expect("open"));
        let mut memory_ids = Vec::new();
        let mut sqlite_ids = Vec::new();

        for op in &ops {
            let left = apply(&mut memory, &mut memory_ids, op);
            let right = apply(&mut sqlite, &mut sqlite_ids, op);
            prop_assert_eq!(left, right, "diverged on {:?}", op);
        }
        prop_assert_eq!(snapshot(&memory), snapshot(&sqlite));
    }
}

#[test]
fn edge_moves_report_at_edge_not_missing() {
    let mut store = OrderedItemStore::new(MemoryBackend::new());
    let only = store.insert(&NewItem::new(1, "solo", ""), 5).expect("insert");
    assert_eq!(store.move_up(only, 5).expect("up"), MoveOutcome::AtEdge);
    assert_eq!(store.move_down(only, 5).expect("down"), MoveOutcome::AtEdge);
}
