//! The live set of candidate words for each slot. Every elimination goes through a rollback log, so
//! the search can take a checkpoint before a speculative choice and restore the exact prior state
//! if the choice doesn't work out.

use bit_set::BitSet;
use smallvec::{smallvec, SmallVec};

use crate::grid_config::{GridConfig, SlotId, WordId};
use crate::{MAX_GLYPH_COUNT, MAX_SLOT_COUNT};

/// Number of options in a slot's domain that place each glyph in one particular cell, indexed by
/// `GlyphId`.
pub type GlyphCounts = SmallVec<[u32; MAX_GLYPH_COUNT]>;

/// A single reversible edit to the domain store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Elimination {
    slot_id: SlotId,
    word_id: WordId,
}

/// A position in the rollback log, returned by `Domains::checkpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Per-slot candidate words, stored as sets of word ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    options: Vec<BitSet>,
    option_counts: SmallVec<[usize; MAX_SLOT_COUNT]>,
    log: Vec<Elimination>,
}

impl Domains {
    /// Build node-consistent domains: each slot starts with every word of its length.
    #[must_use]
    pub fn new(config: &GridConfig) -> Domains {
        let options: Vec<BitSet> = config
            .slot_configs
            .iter()
            .map(|slot_config| {
                let mut set = BitSet::with_capacity(config.words.len());
                for &word_id in config.words_of_length(slot_config.length) {
                    set.insert(word_id);
                }
                set
            })
            .collect();

        let option_counts = options.iter().map(|set| set.len()).collect();

        Domains {
            options,
            option_counts,
            log: vec![],
        }
    }

    #[must_use]
    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.options[slot_id].contains(word_id)
    }

    #[must_use]
    pub fn option_count(&self, slot_id: SlotId) -> usize {
        self.option_counts[slot_id]
    }

    /// The remaining options for a slot, in word id order.
    pub fn options(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.options[slot_id].iter()
    }

    /// The first slot with no options left, if any.
    #[must_use]
    pub fn first_empty_slot(&self) -> Option<SlotId> {
        self.option_counts.iter().position(|&count| count == 0)
    }

    /// Remove a word from a slot's domain, recording the removal so it can be rolled back. Returns
    /// false if the word wasn't there.
    pub fn eliminate(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        if !self.options[slot_id].remove(word_id) {
            return false;
        }
        self.option_counts[slot_id] -= 1;
        self.log.push(Elimination { slot_id, word_id });
        true
    }

    /// Eliminate every option for a slot except the given word.
    pub fn restrict_to(&mut self, slot_id: SlotId, word_id: WordId) {
        let others: Vec<WordId> = self.options(slot_id).filter(|&id| id != word_id).collect();
        for other in others {
            self.eliminate(slot_id, other);
        }
    }

    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.log.len())
    }

    /// Make every elimination so far permanent. Earlier checkpoints are no longer valid.
    pub fn commit(&mut self) {
        self.log.clear();
    }

    /// Undo every elimination made since the given checkpoint, most recent first.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.log.len() > checkpoint.0 {
            if let Some(Elimination { slot_id, word_id }) = self.log.pop() {
                self.options[slot_id].insert(word_id);
                self.option_counts[slot_id] += 1;
            }
        }
    }

    /// Count, for one cell of a slot, how many remaining options put each glyph there.
    #[must_use]
    pub fn build_glyph_counts(
        &self,
        config: &GridConfig,
        slot_id: SlotId,
        cell_idx: usize,
    ) -> GlyphCounts {
        let mut counts: GlyphCounts = smallvec![0; config.glyphs.len()];
        for word_id in self.options(slot_id) {
            counts[config.words[word_id].glyphs[cell_idx]] += 1;
        }
        counts
    }
}
