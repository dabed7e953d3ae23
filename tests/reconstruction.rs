use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use tweet_threads::threading::{ThreadingError, reconstruct_partitioned};
use tweet_threads::{
    ConversationRecord, MessageEdge, MessageId, ReconstructionConfig, reconstruct_conversations,
};

fn record(flow: &[MessageId]) -> ConversationRecord {
    ConversationRecord::from_flow(flow.to_vec()).expect("flow is long enough")
}

fn record_set(records: impl IntoIterator<Item = ConversationRecord>) -> BTreeSet<ConversationRecord> {
    records.into_iter().collect()
}

#[test]
fn branching_thread_yields_one_record_per_leaf() {
    let edges = vec![
        MessageEdge::root(1, vec![2, 3]),
        MessageEdge::reply(2, 1, vec![4]),
        MessageEdge::reply(3, 1, vec![]),
        MessageEdge::reply(4, 2, vec![]),
        MessageEdge::root(5, vec![]),
    ];

    let reconstruction = reconstruct_conversations(edges, &ReconstructionConfig::default())
        .expect("acyclic input reconstructs");

    assert_eq!(
        record_set(reconstruction.into_records()),
        record_set([record(&[1, 2, 4]), record(&[1, 3])])
    );
}

#[test]
fn replies_missing_from_the_relation_end_the_path() {
    // 3 was never extracted, so [1, 2] ends at 2
    let edges = vec![
        MessageEdge::root(1, vec![2]),
        MessageEdge::reply(2, 1, vec![3]),
    ];

    let reconstruction =
        reconstruct_conversations(edges, &ReconstructionConfig::default()).unwrap();

    assert_eq!(reconstruction.into_records(), vec![record(&[1, 2])]);
}

#[test]
fn diamond_duplicates_into_independent_records() {
    // 3 is listed as a reply by both roots
    let edges = vec![
        MessageEdge::root(1, vec![3]),
        MessageEdge::root(2, vec![3]),
        MessageEdge::reply(3, 1, vec![4]),
        MessageEdge::reply(4, 3, vec![]),
    ];

    let reconstruction =
        reconstruct_conversations(edges, &ReconstructionConfig::default()).unwrap();

    assert_eq!(
        record_set(reconstruction.into_records()),
        record_set([record(&[1, 3, 4]), record(&[2, 3, 4])])
    );
}

#[test]
fn reply_cycle_fails_with_cyclic_error() {
    let edges = vec![
        MessageEdge::root(1, vec![2]),
        MessageEdge::reply(2, 1, vec![3]),
        MessageEdge::reply(3, 2, vec![4]),
        MessageEdge::reply(4, 3, vec![2]),
    ];

    for config in [
        ReconstructionConfig::default(),
        ReconstructionConfig::default().parallel(2),
    ] {
        match reconstruct_conversations(edges.clone(), &config) {
            Err(ThreadingError::CyclicStructure { message_id, flow }) => {
                assert_eq!(message_id, 2);
                assert_eq!(flow, vec![1, 2, 3, 4]);
            }
            other => panic!("expected cyclic structure error, got {other:?}"),
        }
    }
}

#[test]
fn reply_reached_again_in_a_later_round_is_followed() {
    // 4 is consumed through 1 in round 1 and reached through 10 -> 11 in round 2
    let edges = vec![
        MessageEdge::root(1, vec![4]),
        MessageEdge::root(10, vec![11]),
        MessageEdge::reply(11, 10, vec![4]),
        MessageEdge::reply(4, 1, vec![5]),
        MessageEdge::reply(5, 4, vec![]),
    ];

    for config in [
        ReconstructionConfig::default(),
        ReconstructionConfig::default().parallel(2),
    ] {
        let reconstruction = reconstruct_conversations(edges.clone(), &config).unwrap();
        assert_eq!(reconstruction.stats.rounds, 3);
        assert_eq!(reconstruction.stats.unreachable_edges, 0);
        assert_eq!(
            record_set(reconstruction.into_records()),
            record_set([record(&[1, 4, 5]), record(&[10, 11, 4, 5])])
        );
    }
}

#[test]
fn uneven_diamond_keeps_both_routes() {
    let edges = vec![
        MessageEdge::root(1, vec![2, 3]),
        MessageEdge::reply(2, 1, vec![3]),
        MessageEdge::reply(3, 1, vec![]),
    ];

    let reconstruction =
        reconstruct_conversations(edges, &ReconstructionConfig::default()).unwrap();

    assert_eq!(
        record_set(reconstruction.into_records()),
        record_set([record(&[1, 3]), record(&[1, 2, 3])])
    );
}

#[test]
fn cycle_between_sibling_branches_fails() {
    let edges = vec![
        MessageEdge::root(1, vec![2, 3]),
        MessageEdge::reply(2, 1, vec![3]),
        MessageEdge::reply(3, 1, vec![2]),
    ];

    for config in [
        ReconstructionConfig::default(),
        ReconstructionConfig::default().parallel(2),
    ] {
        let err = reconstruct_conversations(edges.clone(), &config).unwrap_err();
        assert!(matches!(err, ThreadingError::CyclicStructure { .. }), "got {err:?}");
    }
}

#[test]
fn batches_are_grouped_by_round() {
    let edges = vec![
        MessageEdge::root(1, vec![2]),
        MessageEdge::reply(2, 1, vec![3]),
        MessageEdge::reply(3, 2, vec![]),
        MessageEdge::root(10, vec![11]),
        MessageEdge::reply(11, 10, vec![]),
    ];

    let reconstruction = reconstruct_partitioned(edges, &ReconstructionConfig::default().parallel(4))
        .unwrap();

    let rounds: Vec<(usize, Vec<Vec<MessageId>>)> = reconstruction
        .batches
        .iter()
        .map(|batch| {
            (
                batch.round,
                batch.records.iter().map(|r| r.flow.clone()).collect(),
            )
        })
        .collect();
    assert_eq!(
        rounds,
        vec![(1, vec![vec![10, 11]]), (2, vec![vec![1, 2, 3]])]
    );
}

/// A generated reply graph.
///
/// `parents[i]` is the message `i` replies to. `shared[i]` lists further
/// messages that also appear among `i`'s replies; they always point to a later,
/// non-root message, so the graph stays acyclic and every message remains
/// reachable from a root.
#[derive(Debug, Clone)]
struct ReplyGraph {
    parents: Vec<Option<usize>>,
    shared: Vec<Vec<usize>>,
}

impl ReplyGraph {
    fn id(index: usize) -> MessageId {
        100 + index as MessageId
    }

    fn len(&self) -> usize {
        self.parents.len()
    }

    /// Reply indices of `index`, in order and without duplicates.
    fn children(&self, index: usize) -> Vec<usize> {
        let mut children: Vec<usize> = (0..self.len())
            .filter(|child| self.parents[*child] == Some(index))
            .collect();
        for &target in &self.shared[index] {
            if !children.contains(&target) {
                children.push(target);
            }
        }
        children
    }

    fn edges(&self) -> Vec<MessageEdge> {
        (0..self.len())
            .map(|index| MessageEdge {
                message_id: Self::id(index),
                response_ids: self.children(index).into_iter().map(Self::id).collect(),
                in_response_to_id: self.parents[index].map(Self::id),
            })
            .collect()
    }

    fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|index| self.parents[*index].is_none())
    }

    /// Per message: (root-to-sink paths below it, hops on its longest chain).
    ///
    /// Children always have a larger index, so one backward pass suffices.
    fn path_table(&self) -> Vec<(usize, usize)> {
        let mut table = vec![(1, 0); self.len()];
        for index in (0..self.len()).rev() {
            let children = self.children(index);
            if children.is_empty() {
                continue;
            }
            let paths = children.iter().map(|child| table[*child].0).sum();
            let longest = children.iter().map(|child| table[*child].1 + 1).max().unwrap_or(0);
            table[index] = (paths, longest);
        }
        table
    }

    /// Conversations expected: every root-to-sink route of a root with replies.
    fn route_count(&self) -> usize {
        let table = self.path_table();
        self.roots()
            .filter(|root| !self.children(*root).is_empty())
            .map(|root| table[root].0)
            .sum()
    }

    fn longest_chain(&self) -> usize {
        let table = self.path_table();
        self.roots().map(|root| table[root].1).max().unwrap_or(0)
    }

    /// Messages with a parent and no replies.
    fn leaves(&self) -> HashSet<MessageId> {
        (0..self.len())
            .filter(|index| self.parents[*index].is_some() && self.children(*index).is_empty())
            .map(Self::id)
            .collect()
    }
}

fn reply_graph_strategy(
    nodes: std::ops::Range<usize>,
    max_shared: usize,
) -> impl Strategy<Value = ReplyGraph> {
    prop::collection::vec(
        (
            prop::option::weighted(0.8, any::<prop::sample::Index>()),
            prop::collection::vec(any::<prop::sample::Index>(), 0..=max_shared),
        ),
        nodes,
    )
    .prop_map(|choices| {
        let parents: Vec<Option<usize>> = choices
            .iter()
            .enumerate()
            .map(|(index, (choice, _))| match choice {
                Some(pick) if index > 0 => Some(pick.index(index)),
                _ => None,
            })
            .collect();

        let shared = choices
            .iter()
            .enumerate()
            .map(|(index, (_, picks))| {
                let later: Vec<usize> = (index + 1..parents.len())
                    .filter(|target| parents[*target].is_some())
                    .collect();
                if later.is_empty() {
                    return Vec::new();
                }
                picks.iter().map(|pick| later[pick.index(later.len())]).collect()
            })
            .collect();

        ReplyGraph { parents, shared }
    })
}

/// Plain reply forests: every message is listed by its parent only.
fn forest_strategy() -> impl Strategy<Value = ReplyGraph> {
    reply_graph_strategy(1..48, 0)
}

/// Reply graphs where a message may be listed by several earlier messages.
fn shared_reply_strategy() -> impl Strategy<Value = ReplyGraph> {
    reply_graph_strategy(1..12, 3)
}

fn hops_of(edges: &[MessageEdge]) -> HashSet<(MessageId, MessageId)> {
    edges
        .iter()
        .flat_map(|edge| edge.response_ids.iter().map(move |reply| (edge.message_id, *reply)))
        .collect()
}

proptest! {
    #[test]
    fn records_cover_every_reachable_hop(forest in forest_strategy()) {
        let edges = forest.edges();
        let reconstruction = reconstruct_conversations(edges.clone(), &ReconstructionConfig::default()).unwrap();
        let records: Vec<ConversationRecord> = reconstruction.into_records();

        let output_hops: HashSet<(MessageId, MessageId)> =
            records.iter().flat_map(|record| record.hops()).collect();

        // Every generated message descends from a root, so every hop is reachable
        prop_assert_eq!(&output_hops, &hops_of(&edges));

        // Each leaf terminates exactly one record
        let leaves = forest.leaves();
        prop_assert_eq!(records.len(), leaves.len());
        for leaf in &leaves {
            prop_assert_eq!(records.iter().filter(|r| r.latest_message_id == *leaf).count(), 1);
        }
    }

    #[test]
    fn shared_replies_are_followed_by_every_route(graph in shared_reply_strategy()) {
        let edges = graph.edges();
        let input_hops = hops_of(&edges);
        let replied: HashSet<MessageId> = edges
            .iter()
            .filter(|edge| !edge.response_ids.is_empty())
            .map(|edge| edge.message_id)
            .collect();

        let reconstruction = reconstruct_conversations(edges.clone(), &ReconstructionConfig::default()).unwrap();
        prop_assert_eq!(reconstruction.stats.unreachable_edges, 0);
        let records: Vec<ConversationRecord> = reconstruction.into_records();

        let output_hops: HashSet<(MessageId, MessageId)> =
            records.iter().flat_map(|record| record.hops()).collect();
        prop_assert_eq!(&output_hops, &input_hops);

        // One record per route, no route emitted twice
        prop_assert_eq!(records.len(), graph.route_count());
        prop_assert_eq!(record_set(records.iter().cloned()).len(), records.len());

        for record in &records {
            prop_assert!(record.hops().all(|hop| input_hops.contains(&hop)));
            prop_assert!(!replied.contains(&record.latest_message_id));
        }
    }

    #[test]
    fn records_are_consistent(graph in shared_reply_strategy()) {
        let edges = graph.edges();
        let roots: HashSet<MessageId> = edges
            .iter()
            .filter(|edge| edge.in_response_to_id.is_none())
            .map(|edge| edge.message_id)
            .collect();
        let reconstruction = reconstruct_conversations(edges, &ReconstructionConfig::default()).unwrap();

        for batch in &reconstruction.batches {
            for record in &batch.records {
                prop_assert!(record.length >= 2);
                prop_assert_eq!(record.length, record.flow.len());
                prop_assert_eq!(Some(&record.first_message_id), record.flow.first());
                prop_assert_eq!(Some(&record.latest_message_id), record.flow.last());
                prop_assert!(roots.contains(&record.first_message_id));
                let distinct: HashSet<&MessageId> = record.flow.iter().collect();
                prop_assert_eq!(distinct.len(), record.flow.len());
                // A record completing in round n has n hops
                prop_assert_eq!(record.length, batch.round + 1);
            }
        }
    }

    #[test]
    fn reconstruction_is_deterministic(graph in shared_reply_strategy()) {
        let config = ReconstructionConfig::default();
        let first = reconstruct_conversations(graph.edges(), &config).unwrap();
        let second = reconstruct_conversations(graph.edges(), &config).unwrap();
        let partitioned = reconstruct_conversations(graph.edges(), &config.clone().parallel(3)).unwrap();

        prop_assert_eq!(first.stats.rounds, partitioned.stats.rounds);
        prop_assert_eq!(&first.stats, &second.stats);

        let first = record_set(first.into_records());
        prop_assert_eq!(&first, &record_set(second.into_records()));
        prop_assert_eq!(&first, &record_set(partitioned.into_records()));
    }

    #[test]
    fn rounds_match_longest_reply_chain(graph in shared_reply_strategy()) {
        let longest = graph.longest_chain();
        let config = ReconstructionConfig::default().with_max_rounds(longest);

        let reconstruction = reconstruct_conversations(graph.edges(), &config).unwrap();

        prop_assert_eq!(reconstruction.stats.rounds, longest);
        prop_assert_eq!(reconstruction.stats.longest_conversation, if longest == 0 { 0 } else { longest + 1 });
    }

    #[test]
    fn forest_rounds_match_deepest_leaf(forest in forest_strategy()) {
        let longest = forest.longest_chain();
        let reconstruction = reconstruct_conversations(forest.edges(), &ReconstructionConfig::default()).unwrap();
        prop_assert_eq!(reconstruction.stats.rounds, longest);
    }
}
