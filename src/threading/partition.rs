//! Partitioned parallel reconstruction
//!
//! Messages that are not connected by any reply relation never share an edge,
//! so each connected component can be reconstructed on its own. Components are
//! processed concurrently with Rayon; completed records are merged per round
//! through a DashMap.
//!
//! The result is set-equal to the sequential run. Records inside a merged batch
//! are sorted by `(first_message_id, flow)` so repeated runs produce identical
//! output regardless of scheduling.

use std::collections::HashMap;

use dashmap::DashMap;
use rayon::prelude::*;

use crate::models::{ConversationRecord, MessageEdge, MessageId, RoundBatch};

use super::algorithm::{Reconstruction, ThreadReconstructor};
use super::config::ReconstructionConfig;
use super::error::ThreadingError;
use super::stats::ReconstructionStats;

/// Union-find over message ids
#[derive(Debug, Default)]
struct DisjointSets {
    parent: HashMap<MessageId, MessageId>,
}

impl DisjointSets {
    fn find(&mut self, message_id: MessageId) -> MessageId {
        let mut current = message_id;
        loop {
            let parent = *self.parent.entry(current).or_insert(current);
            if parent == current {
                return current;
            }
            // Path halving
            let grandparent = *self.parent.entry(parent).or_insert(parent);
            self.parent.insert(current, grandparent);
            current = grandparent;
        }
    }

    fn union(&mut self, left: MessageId, right: MessageId) {
        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root != right_root {
            self.parent.insert(right_root, left_root);
        }
    }
}

/// Group edges into connected components
///
/// Two messages are connected when one lists the other as a reply or as the
/// message it responds to. Components are returned in order of their first edge
/// in the input, and edges keep their input order inside a component.
pub fn partition_components(edges: Vec<MessageEdge>) -> Vec<Vec<MessageEdge>> {
    let mut sets = DisjointSets::default();

    for edge in &edges {
        sets.find(edge.message_id);
        for &reply_id in &edge.response_ids {
            sets.union(edge.message_id, reply_id);
        }
        if let Some(parent_id) = edge.in_response_to_id {
            sets.union(edge.message_id, parent_id);
        }
    }

    let mut component_slots: HashMap<MessageId, usize> = HashMap::new();
    let mut components: Vec<Vec<MessageEdge>> = Vec::new();

    for edge in edges {
        let representative = sets.find(edge.message_id);
        let slot = *component_slots.entry(representative).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(edge);
    }

    components
}

/// Reconstruct each connected component concurrently and merge the results
///
/// Any failing partition fails the whole run.
pub fn reconstruct_partitioned(
    edges: Vec<MessageEdge>,
    config: &ReconstructionConfig,
) -> Result<Reconstruction, ThreadingError> {
    let partitions = partition_components(edges);
    log::info!(
        "reconstructing {} partitions with {} threads",
        partitions.len(),
        config.worker_threads
    );

    let thread_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build()
        .map_err(|e| ThreadingError::ThreadPool(e.to_string()))?;

    // DashMap allows concurrent merges from multiple partitions
    let round_buckets: DashMap<usize, Vec<ConversationRecord>> = DashMap::new();

    let partition_stats = thread_pool.install(|| {
        partitions
            .into_par_iter()
            .map(|partition| -> Result<ReconstructionStats, ThreadingError> {
                let reconstruction = ThreadReconstructor::new(partition, config.clone())?.run()?;
                for batch in reconstruction.batches {
                    round_buckets
                        .entry(batch.round)
                        .or_default()
                        .extend(batch.records);
                }
                Ok(reconstruction.stats)
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    let mut stats = ReconstructionStats::default();
    for partition in partition_stats {
        stats.merge(partition);
    }

    let mut batches: Vec<RoundBatch> = round_buckets
        .into_iter()
        .map(|(round, mut records)| {
            records.sort_by(|a, b| {
                (a.first_message_id, &a.flow).cmp(&(b.first_message_id, &b.flow))
            });
            RoundBatch { round, records }
        })
        .collect();
    batches.sort_by_key(|batch| batch.round);

    log::info!(
        "reconstructed {} conversations from {} roots in {} rounds",
        stats.conversations,
        stats.roots,
        stats.rounds
    );

    Ok(Reconstruction { batches, stats })
}
