//! This module implements grid-filling as a depth-first backtracking search that maintains arc
//! consistency. Slots are chosen by minimum remaining values (ties broken by degree, then by slot
//! identity) and words are tried in least-constraining-value order. Every tentative choice is made
//! against a domain checkpoint, so a failed branch leaves no trace in the state its siblings see.

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{debug, info, trace};
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::arc_consistency::{enforce_arc_consistency, SlotArc};
use crate::domains::{Domains, GlyphCounts};
use crate::grid_config::{Choice, GridConfig, Slot, SlotId, WordId};
use crate::MAX_SLOT_COUNT;

/// Limits on how much work a fill attempt may do before giving up. The default is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBudget {
    /// Maximum number of search states (slot selections) to visit.
    pub max_states: Option<u64>,

    /// Maximum wall-clock time to spend, including the initial arc consistency pass.
    pub time_limit: Option<Duration>,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub revisions: u64,
    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,

    /// One choice per slot, in slot id order.
    pub choices: Vec<Choice>,
}

impl FillSuccess {
    /// The fill as a map from slot identity to word.
    #[must_use]
    pub fn words_by_slot<'a>(&self, config: &'a GridConfig) -> BTreeMap<Slot, &'a str> {
        self.choices
            .iter()
            .map(|choice| {
                (
                    config.slot_configs[choice.slot_id].slot(),
                    config.words[choice.word_id].string.as_str(),
                )
            })
            .collect()
    }
}

/// Ways a fill attempt can end without a fill.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    /// Some slot has no words of its length at all, so search was never attempted.
    #[error("slot {slot_id} ({slot:?}) has no words of the right length")]
    TriviallyUnsolvable { slot_id: SlotId, slot: Slot },

    /// Every possibility was explored and none of them work.
    #[error("no solution")]
    HardFailure,

    /// The search budget ran out before the search finished.
    #[error("search budget exhausted after {states} states")]
    ExhaustedBudget { states: u64 },
}

/// The words chosen so far, in the order they were chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    choices: SmallVec<[Choice; MAX_SLOT_COUNT]>,
    word_by_slot: Vec<Option<WordId>>,
    used_words: BitSet,
}

impl Assignment {
    #[must_use]
    pub fn new(slot_count: usize) -> Assignment {
        Assignment {
            choices: SmallVec::new(),
            word_by_slot: vec![None; slot_count],
            used_words: BitSet::new(),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.choices.len() == self.word_by_slot.len()
    }

    #[must_use]
    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.word_by_slot[slot_id].is_some()
    }

    #[must_use]
    pub fn word_for_slot(&self, slot_id: SlotId) -> Option<WordId> {
        self.word_by_slot[slot_id]
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Could this choice be added without breaking any constraint? The word has to fit the slot,
    /// agree with every assigned crossing, and not already be in use.
    #[must_use]
    pub fn is_consistent(&self, config: &GridConfig, choice: &Choice) -> bool {
        let slot_config = &config.slot_configs[choice.slot_id];
        let word = &config.words[choice.word_id];

        if self.is_assigned(choice.slot_id)
            || word.glyphs.len() != slot_config.length
            || self.used_words.contains(choice.word_id)
        {
            return false;
        }

        slot_config
            .crossings
            .iter()
            .zip(&word.glyphs)
            .all(|(crossing, &glyph)| match crossing {
                Some(crossing) => match self.word_for_slot(crossing.other_slot_id) {
                    Some(other_word_id) => {
                        config.words[other_word_id].glyphs[crossing.other_slot_cell] == glyph
                    }
                    None => true,
                },
                None => true,
            })
    }

    pub fn push(&mut self, choice: Choice) {
        self.word_by_slot[choice.slot_id] = Some(choice.word_id);
        self.used_words.insert(choice.word_id);
        self.choices.push(choice);
    }

    /// Undo the most recent choice.
    pub fn pop(&mut self) -> Option<Choice> {
        let choice = self.choices.pop()?;
        self.word_by_slot[choice.slot_id] = None;
        self.used_words.remove(choice.word_id);
        Some(choice)
    }
}

/// Order a slot's remaining options so that the word ruling out the fewest options in unassigned
/// crossing slots comes first. Ties keep word id order.
#[must_use]
pub fn order_domain_values(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
) -> Vec<WordId> {
    let slot_config = &config.slot_configs[slot_id];

    // (cell in this slot, crossing slot, cell in crossing slot, crossing slot's glyph counts)
    let crossing_counts: Vec<(usize, SlotId, usize, GlyphCounts)> = slot_config
        .crossings
        .iter()
        .enumerate()
        .filter_map(|(cell_idx, crossing)| {
            let crossing = crossing.as_ref()?;
            if assignment.is_assigned(crossing.other_slot_id) {
                return None;
            }
            Some((
                cell_idx,
                crossing.other_slot_id,
                crossing.other_slot_cell,
                domains.build_glyph_counts(config, crossing.other_slot_id, crossing.other_slot_cell),
            ))
        })
        .collect();

    let mut options: Vec<WordId> = domains.options(slot_id).collect();
    options.sort_by_cached_key(|&word_id| {
        count_ruled_out_options(config, domains, &crossing_counts, word_id)
    });
    options
}

/// How many options in the given crossing slots would become impossible if this word were chosen:
/// those with a different letter at the crossing, plus the word itself if it's also an option
/// there.
fn count_ruled_out_options(
    config: &GridConfig,
    domains: &Domains,
    crossing_counts: &[(usize, SlotId, usize, GlyphCounts)],
    word_id: WordId,
) -> usize {
    let glyphs = &config.words[word_id].glyphs;

    crossing_counts
        .iter()
        .map(|(cell_idx, other_slot_id, other_slot_cell, glyph_counts)| {
            let glyph = glyphs[*cell_idx];
            let mut compatible = glyph_counts[glyph] as usize;
            if domains.contains(*other_slot_id, word_id) && glyphs[*other_slot_cell] == glyph {
                compatible -= 1;
            }
            domains.option_count(*other_slot_id) - compatible
        })
        .sum()
}

/// Live state of a single fill attempt.
struct Search<'a> {
    config: &'a GridConfig,
    domains: Domains,
    assignment: Assignment,
    statistics: Statistics,
    budget: SearchBudget,
    start: Instant,
}

impl<'a> Search<'a> {
    fn new(config: &'a GridConfig, domains: Domains, budget: SearchBudget, start: Instant) -> Self {
        Search {
            config,
            domains,
            assignment: Assignment::new(config.slot_configs.len()),
            statistics: Statistics::default(),
            budget,
            start,
        }
    }

    /// Pick the unassigned slot with the fewest remaining options, preferring the slot with the
    /// most crossings and then the earliest slot in the grid.
    fn select_unassigned_slot(&self) -> Option<SlotId> {
        self.config
            .slot_configs
            .iter()
            .filter(|slot_config| !self.assignment.is_assigned(slot_config.id))
            .min_by_key(|slot_config| {
                (
                    self.domains.option_count(slot_config.id),
                    Reverse(slot_config.neighbors.len()),
                    slot_config.slot(),
                )
            })
            .map(|slot_config| slot_config.id)
    }

    fn check_budget(&self) -> Result<(), FillFailure> {
        let states = self.statistics.states;
        let over_states = self.budget.max_states.map_or(false, |max| states > max);
        let over_time = self
            .budget
            .time_limit
            .map_or(false, |limit| self.start.elapsed() > limit);

        if over_states || over_time {
            debug!("Search budget exhausted after {states} states");
            return Err(FillFailure::ExhaustedBudget { states });
        }
        Ok(())
    }

    /// Recursively extend the assignment. `Ok(true)` means the assignment is now complete,
    /// `Ok(false)` means no extension of the current state works, and `Err` means the search was
    /// cut off by its budget.
    fn backtrack(&mut self) -> Result<bool, FillFailure> {
        let Some(slot_id) = self.select_unassigned_slot() else {
            return Ok(true);
        };

        self.statistics.states += 1;
        self.check_budget()?;

        trace!(
            "State {}: filling slot {} ({} options, {} assigned)",
            self.statistics.states,
            slot_id,
            self.domains.option_count(slot_id),
            self.assignment.choices().len(),
        );

        for word_id in order_domain_values(self.config, &self.domains, &self.assignment, slot_id) {
            if self.try_choice(Choice { slot_id, word_id })? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Tentatively make a choice, propagate it, and recurse. If that doesn't lead to a full fill,
    /// the assignment and domains are restored to exactly what they were before the call.
    fn try_choice(&mut self, choice: Choice) -> Result<bool, FillFailure> {
        if !self.assignment.is_consistent(self.config, &choice) {
            return Ok(false);
        }

        let checkpoint = self.domains.checkpoint();
        self.assignment.push(choice);

        if self.propagate_choice(&choice) && self.backtrack()? {
            return Ok(true);
        }

        self.assignment.pop();
        self.domains.rollback(checkpoint);
        self.statistics.backtracks += 1;

        Ok(false)
    }

    /// Shrink the chosen slot's domain to the chosen word, remove that word from every other open
    /// slot, and re-establish arc consistency around everything that changed. Returns false if any
    /// slot runs out of options.
    fn propagate_choice(&mut self, choice: &Choice) -> bool {
        self.domains.restrict_to(choice.slot_id, choice.word_id);

        let mut changed_slot_ids: SmallVec<[SlotId; MAX_SLOT_COUNT]> = SmallVec::new();
        changed_slot_ids.push(choice.slot_id);

        for slot_config in &self.config.slot_configs {
            if slot_config.id == choice.slot_id || self.assignment.is_assigned(slot_config.id) {
                continue;
            }
            if self.domains.eliminate(slot_config.id, choice.word_id) {
                if self.domains.option_count(slot_config.id) == 0 {
                    return false;
                }
                changed_slot_ids.push(slot_config.id);
            }
        }

        let config = self.config;
        let assignment = &self.assignment;
        let arcs: Vec<SlotArc> = changed_slot_ids
            .iter()
            .flat_map(move |&changed_slot_id| {
                config.slot_configs[changed_slot_id]
                    .neighbors
                    .iter()
                    .filter(move |&&neighbor| !assignment.is_assigned(neighbor))
                    .map(move |&neighbor| SlotArc {
                        from: neighbor,
                        to: changed_slot_id,
                    })
            })
            .collect();

        match enforce_arc_consistency(self.config, &mut self.domains, Some(&arcs)) {
            Ok(success) => {
                self.statistics.revisions += success.revisions as u64;
                true
            }
            Err(failure) => {
                self.statistics.revisions += failure.revisions as u64;
                false
            }
        }
    }
}

/// Search for a valid fill for the given grid with no limits on the search.
pub fn find_fill(config: &GridConfig) -> Result<FillSuccess, FillFailure> {
    find_fill_with_budget(config, SearchBudget::default())
}

/// Search for a valid fill for the given grid, giving up if the budget runs out.
pub fn find_fill_with_budget(
    config: &GridConfig,
    budget: SearchBudget,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();

    let mut domains = Domains::new(config);

    if let Some(slot_id) = domains.first_empty_slot() {
        let slot = config.slot_configs[slot_id].slot();
        debug!("Slot {slot_id} ({slot:?}) has no options after node consistency");
        return Err(FillFailure::TriviallyUnsolvable { slot_id, slot });
    }

    let initial_revisions = match enforce_arc_consistency(config, &mut domains, None) {
        Ok(success) => success.revisions,
        Err(failure) => {
            debug!(
                "Initial arc consistency emptied slot {} after {} revisions",
                failure.empty_slot_id, failure.revisions
            );
            return Err(FillFailure::HardFailure);
        }
    };
    debug!("Initial arc consistency made {initial_revisions} revisions");
    domains.commit();

    let mut search = Search::new(config, domains, budget, start);
    search.statistics.revisions += initial_revisions as u64;
    search.check_budget()?;

    let filled = search.backtrack()?;
    search.statistics.duration = start.elapsed();

    if !filled {
        info!(
            "No fill exists ({} states, {} backtracks, {:?})",
            search.statistics.states, search.statistics.backtracks, search.statistics.duration
        );
        return Err(FillFailure::HardFailure);
    }

    info!(
        "Found a fill ({} states, {} backtracks, {:?})",
        search.statistics.states, search.statistics.backtracks, search.statistics.duration
    );

    let mut choices = search.assignment.choices().to_vec();
    choices.sort_by_key(|choice| choice.slot_id);

    Ok(FillSuccess {
        statistics: search.statistics,
        choices,
    })
}

#[cfg(test)]
mod tests {
    use instant::{Duration, Instant};
    use proptest::prelude::*;
    use std::collections::HashSet;

    use crate::arc_consistency::enforce_arc_consistency;
    use crate::backtracking_search::{
        find_fill, find_fill_with_budget, order_domain_values, Assignment, FillFailure,
        FillSuccess, Search, SearchBudget,
    };
    use crate::domains::Domains;
    use crate::grid_config::{
        generate_grid_config, generate_grid_config_from_template_string,
        generate_square_grid_config, render_grid, Choice, Direction, GridConfig, GridEntry, Slot,
    };

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|word| word.to_string()).collect()
    }

    /// Check every constraint against a finished fill.
    fn assert_valid_fill(config: &GridConfig, result: &FillSuccess) {
        assert_eq!(result.choices.len(), config.slot_configs.len());

        let mut seen_words = HashSet::new();
        for choice in &result.choices {
            let slot_config = &config.slot_configs[choice.slot_id];
            let word = &config.words[choice.word_id];

            assert_eq!(word.string.chars().count(), slot_config.length);
            assert!(seen_words.insert(choice.word_id), "{} used twice", word.string);
        }

        let word_for_slot = |slot_id: usize| {
            let choice = result.choices.iter().find(|c| c.slot_id == slot_id).unwrap();
            &config.words[choice.word_id]
        };
        for a in 0..config.slot_configs.len() {
            for b in 0..config.slot_configs.len() {
                if let Some((a_cell, b_cell)) = config.overlap(a, b) {
                    assert_eq!(word_for_slot(a).glyphs[a_cell], word_for_slot(b).glyphs[b_cell]);
                }
            }
        }
    }

    /// Exhaustively look for any valid fill, for checking the solver on tiny grids.
    fn brute_force_fill_exists(config: &GridConfig, assignment: &mut Assignment) -> bool {
        let Some(slot_id) = (0..config.slot_configs.len()).find(|&id| !assignment.is_assigned(id))
        else {
            return true;
        };

        for &word_id in config.words_of_length(config.slot_configs[slot_id].length) {
            let choice = Choice { slot_id, word_id };
            if assignment.is_consistent(config, &choice) {
                assignment.push(choice);
                if brute_force_fill_exists(config, assignment) {
                    return true;
                }
                assignment.pop();
            }
        }

        false
    }

    #[test]
    fn test_single_slot_grid() {
        let grid_config = generate_grid_config(
            &words(&["four", "five"]),
            &[GridEntry { loc: (0, 0), len: 4, dir: Direction::Across }],
        )
        .unwrap();

        let result = find_fill(&grid_config).expect("Failed to find a fill");

        assert_valid_fill(&grid_config, &result);
        let filled = result.words_by_slot(&grid_config);
        assert!(matches!(filled.values().next(), Some(&"FOUR") | Some(&"FIVE")));
    }

    #[test]
    fn test_crossing_without_shared_letter_fails() {
        let grid_config = generate_grid_config(
            &words(&["cat", "dog"]),
            &[
                GridEntry { loc: (0, 1), len: 3, dir: Direction::Across },
                GridEntry { loc: (1, 0), len: 3, dir: Direction::Down },
            ],
        )
        .unwrap();
        assert_eq!(grid_config.overlap(0, 1), Some((1, 1)));

        let result = find_fill(&grid_config);

        assert_eq!(result.unwrap_err(), FillFailure::HardFailure);
    }

    #[test]
    fn test_crossing_with_shared_letter() {
        let grid_config = generate_grid_config(
            &words(&["cat", "arc"]),
            &[
                GridEntry { loc: (0, 0), len: 3, dir: Direction::Across },
                GridEntry { loc: (1, 0), len: 3, dir: Direction::Down },
            ],
        )
        .unwrap();
        assert_eq!(grid_config.overlap(0, 1), Some((1, 0)));

        let result = find_fill(&grid_config).expect("Failed to find a fill");

        let filled = result.words_by_slot(&grid_config);
        let across = Slot { row: 0, col: 0, direction: Direction::Across, length: 3 };
        let down = Slot { row: 0, col: 1, direction: Direction::Down, length: 3 };
        assert_eq!(filled[&across], "CAT");
        assert_eq!(filled[&down], "ARC");
        assert_eq!(render_grid(&grid_config, &result.choices), "CAT\n#R#\n#C#");
    }

    #[test]
    fn test_slot_without_words_is_trivially_unsolvable() {
        let grid_config = generate_grid_config(
            &words(&["cat", "arc"]),
            &[
                GridEntry { loc: (0, 0), len: 3, dir: Direction::Across },
                GridEntry { loc: (1, 0), len: 7, dir: Direction::Down },
            ],
        )
        .unwrap();

        let result = find_fill(&grid_config);

        assert_eq!(
            result.unwrap_err(),
            FillFailure::TriviallyUnsolvable {
                slot_id: 1,
                slot: Slot { row: 0, col: 1, direction: Direction::Down, length: 7 },
            }
        );
    }

    /// CAB
    /// ODE
    /// WET
    #[test]
    fn test_find_fill_for_3x3_square() {
        let grid_config = generate_square_grid_config(
            &words(&["cab", "ode", "wet", "cow", "ade", "bet", "cat", "dog", "ten", "owe"]),
            3,
        )
        .unwrap();

        let result = find_fill(&grid_config).expect("Failed to find a fill");

        println!("{:?}", result.statistics);
        println!("{}", render_grid(&grid_config, &result.choices));
        assert_valid_fill(&grid_config, &result);
    }

    #[test]
    fn test_find_fill_for_template_with_blocks() {
        let grid_config = generate_grid_config_from_template_string(
            &words(&[
                "as", "to", "at", "so", "tao", "oat", "sat", "ant", "tan", "nat", "sot", "oas",
                "ta", "an", "no", "on",
            ]),
            "
            #..
            ...
            ..#
            ",
        )
        .unwrap();

        let result = find_fill(&grid_config).expect("Failed to find a fill");

        println!("{:?}", result.statistics);
        println!("{}", render_grid(&grid_config, &result.choices));
        assert_valid_fill(&grid_config, &result);
    }

    #[test]
    fn test_fill_fails_gracefully() {
        let grid_config = generate_grid_config_from_template_string(
            &words(&["aa", "ab", "ba"]),
            "
            ..
            ..
            ",
        )
        .unwrap();

        let result = find_fill(&grid_config);

        assert_eq!(result.unwrap_err(), FillFailure::HardFailure);
    }

    #[test]
    fn test_budget_exhaustion_is_distinct_from_failure() {
        let grid_config = generate_square_grid_config(
            &words(&["cab", "ode", "wet", "cow", "ade", "bet"]),
            3,
        )
        .unwrap();

        let result = find_fill_with_budget(
            &grid_config,
            SearchBudget { max_states: Some(0), time_limit: None },
        );

        assert_eq!(result.unwrap_err(), FillFailure::ExhaustedBudget { states: 1 });
    }

    #[test]
    fn test_failed_branch_is_rolled_back() {
        let grid_config = generate_grid_config(
            &words(&["dog", "cat", "cot"]),
            &[
                GridEntry { loc: (0, 0), len: 3, dir: Direction::Across },
                GridEntry { loc: (0, 0), len: 3, dir: Direction::Down },
            ],
        )
        .unwrap();

        // Skip the initial arc consistency pass so that DOG is still an option for slot 0.
        let mut search = Search::new(
            &grid_config,
            Domains::new(&grid_config),
            SearchBudget::default(),
            Instant::now(),
        );
        let domains_before = search.domains.clone();
        let assignment_before = search.assignment.clone();

        let filled = search.try_choice(Choice { slot_id: 0, word_id: 0 }).unwrap();

        assert!(!filled);
        assert_eq!(search.domains, domains_before);
        assert_eq!(search.assignment, assignment_before);
        assert_eq!(search.statistics.backtracks, 1);

        // A sibling branch still sees the full domains and succeeds.
        assert!(search.try_choice(Choice { slot_id: 0, word_id: 1 }).unwrap());
        assert!(search.assignment.is_complete());
        assert_eq!(search.assignment.word_for_slot(1), Some(2));
    }

    #[test]
    fn test_assignment_consistency() {
        let grid_config = generate_grid_config(
            &words(&["cat", "arc", "ant"]),
            &[
                GridEntry { loc: (0, 0), len: 3, dir: Direction::Across },
                GridEntry { loc: (1, 0), len: 3, dir: Direction::Down },
            ],
        )
        .unwrap();
        let mut assignment = Assignment::new(2);

        assignment.push(Choice { slot_id: 0, word_id: 0 });

        assert!(assignment.is_consistent(&grid_config, &Choice { slot_id: 1, word_id: 1 }));
        assert!(assignment.is_consistent(&grid_config, &Choice { slot_id: 1, word_id: 2 }));
        // CAT is already used.
        assert!(!assignment.is_consistent(&grid_config, &Choice { slot_id: 1, word_id: 0 }));
        // Slot 0 is already filled.
        assert!(!assignment.is_consistent(&grid_config, &Choice { slot_id: 0, word_id: 1 }));

        assert_eq!(assignment.pop(), Some(Choice { slot_id: 0, word_id: 0 }));
        assert_eq!(assignment, Assignment::new(2));
    }

    #[test]
    fn test_least_constraining_value_order() {
        // The down slot crosses the across slot's last cell.
        let grid_config = generate_grid_config(
            &words(&["abx", "aby", "xaa", "xbb", "xcc", "yaa"]),
            &[
                GridEntry { loc: (0, 0), len: 3, dir: Direction::Across },
                GridEntry { loc: (2, 0), len: 3, dir: Direction::Down },
            ],
        )
        .unwrap();
        let domains = Domains::new(&grid_config);
        let assignment = Assignment::new(2);

        let ordered = order_domain_values(&grid_config, &domains, &assignment, 0);
        let strings: Vec<&str> =
            ordered.iter().map(|&id| grid_config.words[id].string.as_str()).collect();

        // The down slot has three words starting with X, two with A, one with Y, and none with
        // B or C. Ties keep word list order.
        assert_eq!(strings, vec!["ABX", "XAA", "YAA", "ABY", "XBB", "XCC"]);
    }

    #[test]
    fn test_slot_selection_prefers_fewest_options() {
        let grid_config = generate_grid_config_from_template_string(
            &words(&["cat", "car", "tar", "rat", "art", "arc"]),
            "
            ...
            .#.
            ...
            ",
        )
        .unwrap();
        let mut domains = Domains::new(&grid_config);
        let search = Search::new(
            &grid_config,
            domains.clone(),
            SearchBudget::default(),
            Instant::now(),
        );

        // Every slot has the same options and two crossings, so the top-left slot wins.
        assert_eq!(search.select_unassigned_slot(), Some(0));

        domains.eliminate(3, 0);
        let search = Search::new(&grid_config, domains, SearchBudget::default(), Instant::now());
        assert_eq!(search.select_unassigned_slot(), Some(3));
    }

    #[test]
    fn test_slot_selection_prefers_more_crossings_on_ties() {
        let grid_config = generate_grid_config_from_template_string(
            &words(&["cat", "car", "tar", "rat", "art", "arc"]),
            "
            .#.
            ...
            .#.
            ",
        )
        .unwrap();
        let across = &grid_config.slot_configs[0];
        assert_eq!(across.slot(), Slot { row: 1, col: 0, direction: Direction::Across, length: 3 });
        assert_eq!(across.neighbors.len(), 2);

        let search = Search::new(
            &grid_config,
            Domains::new(&grid_config),
            SearchBudget::default(),
            Instant::now(),
        );

        // Both down slots come earlier in grid order but cross only one slot each.
        assert_eq!(search.select_unassigned_slot(), Some(0));
    }

    #[test]
    fn test_time_limit_covers_initial_arc_consistency() {
        let grid_config = generate_square_grid_config(
            &words(&["cab", "ode", "wet", "cow", "ade", "bet"]),
            3,
        )
        .unwrap();

        let result = find_fill_with_budget(
            &grid_config,
            SearchBudget { max_states: None, time_limit: Some(Duration::ZERO) },
        );

        assert_eq!(result.unwrap_err(), FillFailure::ExhaustedBudget { states: 0 });
    }

    fn vocabulary() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[ABC]{3}", 1..9)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Any fill the solver returns satisfies every constraint, and the solver only gives up
        /// when no fill exists.
        #[test]
        fn test_fill_matches_brute_force(word_list in vocabulary()) {
            let grid_config = generate_grid_config_from_template_string(
                &word_list,
                "
                ...
                .#.
                ...
                ",
            )
            .unwrap();

            let exists = brute_force_fill_exists(
                &grid_config,
                &mut Assignment::new(grid_config.slot_configs.len()),
            );

            match find_fill(&grid_config) {
                Ok(result) => {
                    assert_valid_fill(&grid_config, &result);
                    prop_assert!(exists);
                }
                Err(failure) => {
                    prop_assert_eq!(failure, FillFailure::HardFailure);
                    prop_assert!(!exists);
                }
            }
        }

        /// The initial pass never removes a word that some fill actually uses.
        #[test]
        fn test_arc_consistency_keeps_solutions(word_list in vocabulary()) {
            let grid_config = generate_square_grid_config(&word_list, 3).unwrap();
            let mut domains = Domains::new(&grid_config);
            let consistent = enforce_arc_consistency(&grid_config, &mut domains, None).is_ok();

            if let Ok(result) = find_fill(&grid_config) {
                prop_assert!(consistent);
                for choice in &result.choices {
                    prop_assert!(domains.contains(choice.slot_id, choice.word_id));
                }
            }
        }
    }
}
