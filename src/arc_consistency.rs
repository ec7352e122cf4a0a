//! This module contains a crossword-specific implementation of the AC-3 algorithm for establishing
//! and maintaining arc consistency. For our purposes, the grid is arc-consistent when every option
//! for every slot has at least one distinct, compatible option in each crossing slot: a word that
//! puts the same letter in the shared cell.
//!
//! The same entry point handles both the global pass run before filling starts and the targeted
//! passes the search runs after each tentative choice.

use log::trace;
use std::collections::{HashSet, VecDeque};

use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId, WordId};

/// A directed constraint between two crossing slots: `from`'s options must each be supported by
/// some option in `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotArc {
    pub from: SlotId,
    pub to: SlotId,
}

/// Worklist of arcs still to be revised. An arc that's already waiting isn't added a second time.
#[derive(Debug)]
struct ConsistencyQueue {
    queue: VecDeque<SlotArc>,
    queued: HashSet<SlotArc>,
}

impl ConsistencyQueue {
    fn with_initial_queue<Items>(items: Items) -> ConsistencyQueue
    where
        Items: IntoIterator<Item = SlotArc>,
    {
        let mut queue = ConsistencyQueue {
            queue: VecDeque::new(),
            queued: HashSet::new(),
        };
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<SlotArc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: SlotArc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Result from a successful call to `enforce_arc_consistency`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many revisions actually removed something.
    pub revisions: usize,
}

/// Result from a failed call to `enforce_arc_consistency`: the slot whose domain was wiped out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub empty_slot_id: SlotId,
    pub revisions: usize,
}

/// Result from a call to `enforce_arc_consistency`.
pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Every ordered pair of crossing slots in the grid.
#[must_use]
pub fn all_arcs(config: &GridConfig) -> Vec<SlotArc> {
    config
        .slot_configs
        .iter()
        .flat_map(|slot_config| {
            slot_config.neighbors.iter().map(move |&neighbor| SlotArc {
                from: slot_config.id,
                to: neighbor,
            })
        })
        .collect()
}

/// Make `x` arc-consistent with `y`, removing every option for `x` that has no distinct option in
/// `y` sharing its letter at the crossing. Returns whether anything was removed. If the slots don't
/// cross, nothing happens.
pub fn revise(config: &GridConfig, domains: &mut Domains, x: SlotId, y: SlotId) -> bool {
    let Some((x_cell, y_cell)) = config.overlap(x, y) else {
        return false;
    };

    let y_glyph_counts = domains.build_glyph_counts(config, y, y_cell);

    let unsupported: Vec<WordId> = domains
        .options(x)
        .filter(|&word_id| {
            let glyphs = &config.words[word_id].glyphs;
            let glyph = glyphs[x_cell];
            let mut support = y_glyph_counts[glyph];

            // A word can't support itself, since the same word can't fill both slots.
            if domains.contains(y, word_id) && glyphs[y_cell] == glyph {
                support -= 1;
            }

            support == 0
        })
        .collect();

    for &word_id in &unsupported {
        domains.eliminate(x, word_id);
    }

    !unsupported.is_empty()
}

/// Run AC-3 starting from the given arcs, or from every arc in the grid if `initial_arcs` is None.
/// Whenever a revision shrinks a slot, every other arc pointing into that slot is rechecked. Gives
/// up as soon as any slot runs out of options; the domains are left partially pruned in that case,
/// so callers that want to continue need to roll them back.
pub fn enforce_arc_consistency(
    config: &GridConfig,
    domains: &mut Domains,
    initial_arcs: Option<&[SlotArc]>,
) -> ArcConsistencyResult {
    let mut queue = match initial_arcs {
        Some(arcs) => ConsistencyQueue::with_initial_queue(arcs.iter().copied()),
        None => ConsistencyQueue::with_initial_queue(all_arcs(config)),
    };
    let mut revisions = 0;

    while let Some(SlotArc { from: x, to: y }) = queue.pop_front() {
        if !revise(config, domains, x, y) {
            continue;
        }
        revisions += 1;

        if domains.option_count(x) == 0 {
            trace!("Arc consistency emptied slot {x} while revising against slot {y}");
            return Err(ArcConsistencyFailure {
                empty_slot_id: x,
                revisions,
            });
        }

        for &z in &config.slot_configs[x].neighbors {
            if z != y {
                queue.enqueue(SlotArc { from: z, to: x });
            }
        }
    }

    Ok(ArcConsistencySuccess { revisions })
}

/// Return the pruned options for each slot in the grid after node consistency and a global arc
/// consistency pass, without doing any search. If some slot ends up with no options, the failure
/// identifies it.
pub fn arc_consistent_options(
    config: &GridConfig,
) -> Result<Vec<Vec<WordId>>, ArcConsistencyFailure> {
    let mut domains = Domains::new(config);

    if let Some(empty_slot_id) = domains.first_empty_slot() {
        return Err(ArcConsistencyFailure {
            empty_slot_id,
            revisions: 0,
        });
    }

    enforce_arc_consistency(config, &mut domains, None)?;

    Ok(config
        .slot_configs
        .iter()
        .map(|slot_config| domains.options(slot_config.id).collect())
        .collect())
}
