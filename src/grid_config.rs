//! This module describes the static side of a fill: the slots in the grid, the crossings between
//! them, and the vocabulary they draw from. Nothing in here changes once the solver starts.

use smallvec::{smallvec, SmallVec};
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};
use thiserror::Error;

use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// An identifier for a given letter, based on its index in the `GridConfig`'s `glyphs` field.
pub type GlyphId = usize;

/// An identifier for a given slot, based on its index in the `GridConfig`'s `slot_configs` field.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the `GridConfig`'s `words` field.
pub type WordId = usize;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// The identity of a slot, compared by value. The derived ordering (row, then column, then
/// direction, then length) is what the search uses to break ties deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

/// A struct representing a word that can be chosen for a given slot.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A struct representing the aspects of a slot in the grid that are static during filling.
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// One entry per cell; `Some` when another slot passes through that cell.
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,

    /// Ids of every slot that crosses this one, sorted and without repeats.
    pub neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]>,
}

impl SlotConfig {
    /// The value identity of this slot.
    #[must_use]
    pub fn slot(&self) -> Slot {
        Slot {
            row: self.start_cell.1,
            col: self.start_cell.0,
            direction: self.direction,
            length: self.length,
        }
    }

    /// Generate the coords for each cell of this slot.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        cell_coords(self.start_cell, self.length, self.direction)
    }

    /// Where this slot meets the given slot, as (cell in this slot, cell in the other slot).
    #[must_use]
    pub fn crossing_with(&self, other_slot_id: SlotId) -> Option<(usize, usize)> {
        self.crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_slot_id == other_slot_id => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            })
    }
}

impl Debug for SlotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotConfig")
            .field("id", &self.id)
            .field("start_cell", &self.start_cell)
            .field("direction", &self.direction)
            .field("length", &self.length)
            .field("crossings", &self.crossings)
            .finish()
    }
}

fn cell_coords(start_cell: GridCoord, length: usize, direction: Direction) -> Vec<GridCoord> {
    (0..length)
        .map(|cell_idx| match direction {
            Direction::Across => (start_cell.0 + cell_idx, start_cell.1),
            Direction::Down => (start_cell.0, start_cell.1 + cell_idx),
        })
        .collect()
}

/// A struct representing the aspects of a grid that are static during filling.
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,
    pub words: Vec<Word>,

    /// Word ids grouped by length, so that `word_ids_by_length[n]` lists every word with `n`
    /// chars. Lengths that no slot needs are left empty.
    pub word_ids_by_length: Vec<Vec<WordId>>,
    pub slot_configs: Vec<SlotConfig>,
}

impl GridConfig {
    /// The overlap between two slots, as (cell in `slot_a`, cell in `slot_b`). The relation is
    /// stored in both directions, so `overlap(b, a)` is always the mirror of `overlap(a, b)`.
    #[must_use]
    pub fn overlap(&self, slot_a: SlotId, slot_b: SlotId) -> Option<(usize, usize)> {
        if slot_a == slot_b {
            return None;
        }
        self.slot_configs[slot_a].crossing_with(slot_b)
    }

    /// Every word in the vocabulary with the given length.
    #[must_use]
    pub fn words_of_length(&self, length: usize) -> &[WordId] {
        self.word_ids_by_length
            .get(length)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("glyphs", &self.glyphs)
            .field("slot_configs", &self.slot_configs)
            .field("words", &format!("({} entries)", self.words.len()))
            .finish()
    }
}

/// Ways a structural description of a grid can be malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridConfigError {
    #[error("grid has no slots")]
    NoSlots,

    #[error("entry starting at {loc:?} has zero length")]
    EmptyEntry { loc: GridCoord },

    #[error("entries {first} and {second} run in the same direction through cell {loc:?}")]
    ParallelEntries {
        first: usize,
        second: usize,
        loc: GridCoord,
    },

    #[error("row {row} has {found} cells but the first row has {expected}")]
    RaggedTemplate {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unexpected character {cell:?} at row {row}, column {col}")]
    InvalidTemplateCell { row: usize, col: usize, cell: char },
}

/// An across or down entry in the input to `generate_grid_config`.
#[derive(Debug, Clone)]
pub struct GridEntry {
    pub loc: GridCoord,
    pub len: usize,
    pub dir: Direction,
}

impl GridEntry {
    /// Generate the coords for each cell of this entry.
    fn cell_coords(&self) -> Vec<GridCoord> {
        cell_coords(self.loc, self.len, self.dir)
    }
}

/// Generate a GridConfig representing a grid with the specified entries. Words are upper-cased and
/// deduplicated (keeping the first occurrence), and words whose length doesn't match any entry are
/// dropped.
pub fn generate_grid_config(
    word_list: &[String],
    entries: &[GridEntry],
) -> Result<GridConfig, GridConfigError> {
    if entries.is_empty() {
        return Err(GridConfigError::NoSlots);
    }
    if let Some(entry) = entries.iter().find(|entry| entry.len == 0) {
        return Err(GridConfigError::EmptyEntry { loc: entry.loc });
    }

    // Keep a list of which slot lengths we actually need, to avoid processing irrelevant words.
    let word_lengths: HashSet<usize> = entries.iter().map(|entry| entry.len).collect();
    let max_length = word_lengths.iter().copied().max().unwrap_or(0);

    let mut seen_words: HashSet<String> = HashSet::new();
    let vocabulary: Vec<String> = word_list
        .iter()
        .map(|word| word.trim().to_uppercase())
        .filter(|word| word_lengths.contains(&word.chars().count()))
        .filter(|word| seen_words.insert(word.clone()))
        .collect();

    // Record every distinct character in the order we first see it, so glyph ids are stable
    // from run to run.
    let mut glyphs: SmallVec<[char; MAX_GLYPH_COUNT]> = smallvec![];
    let mut glyph_ids_by_char: HashMap<char, GlyphId> = HashMap::new();
    for word in &vocabulary {
        for char in word.chars() {
            glyph_ids_by_char.entry(char).or_insert_with(|| {
                glyphs.push(char);
                glyphs.len() - 1
            });
        }
    }

    let mut words: Vec<Word> = Vec::with_capacity(vocabulary.len());
    let mut word_ids_by_length: Vec<Vec<WordId>> = (0..=max_length).map(|_| vec![]).collect();
    for string in vocabulary {
        let glyph_ids = string.chars().map(|c| glyph_ids_by_char[&c]).collect();
        word_ids_by_length[string.chars().count()].push(words.len());
        words.push(Word {
            string,
            glyphs: glyph_ids,
        });
    }

    // Build a map from cell location to the entries passing through it, which we can then use
    // to calculate crossings. Two entries in the same direction can't share a cell, which also
    // means no cell can hold more than two entries.
    let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(usize, usize); 2]>> = HashMap::new();
    for (entry_idx, entry) in entries.iter().enumerate() {
        for (cell_idx, loc) in entry.cell_coords().into_iter().enumerate() {
            let cell_entries = entries_by_loc.entry(loc).or_default();

            if let Some(&(other_idx, _)) = cell_entries
                .iter()
                .find(|&&(other_idx, _)| entries[other_idx].dir == entry.dir)
            {
                return Err(GridConfigError::ParallelEntries {
                    first: other_idx,
                    second: entry_idx,
                    loc,
                });
            }

            cell_entries.push((entry_idx, cell_idx));
        }
    }

    let width = entries_by_loc.keys().map(|&(x, _)| x + 1).max().unwrap_or(0);
    let height = entries_by_loc.keys().map(|&(_, y)| y + 1).max().unwrap_or(0);

    // Now we can build the actual slots.
    let slot_configs = entries
        .iter()
        .enumerate()
        .map(|(entry_idx, entry)| {
            let crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]> = entry
                .cell_coords()
                .iter()
                .map(|loc| {
                    entries_by_loc[loc]
                        .iter()
                        .find(|&&(other_idx, _)| other_idx != entry_idx)
                        .map(|&(other_slot_id, other_slot_cell)| Crossing {
                            other_slot_id,
                            other_slot_cell,
                        })
                })
                .collect();

            let mut neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]> = crossings
                .iter()
                .flatten()
                .map(|crossing| crossing.other_slot_id)
                .collect();
            neighbors.sort_unstable();
            neighbors.dedup();

            SlotConfig {
                id: entry_idx,
                start_cell: entry.loc,
                direction: entry.dir,
                length: entry.len,
                crossings,
                neighbors,
            }
        })
        .collect();

    Ok(GridConfig {
        width,
        height,
        glyphs,
        words,
        word_ids_by_length,
        slot_configs,
    })
}

/// Generate a GridConfig representing a square grid with no blocks.
pub fn generate_square_grid_config(
    word_list: &[String],
    square_size: usize,
) -> Result<GridConfig, GridConfigError> {
    let entries: Vec<GridEntry> = (0..square_size)
        .map(|idx| GridEntry {
            loc: (0, idx),
            len: square_size,
            dir: Direction::Across,
        })
        .chain((0..square_size).map(|idx| GridEntry {
            loc: (idx, 0),
            len: square_size,
            dir: Direction::Down,
        }))
        .collect();

    generate_grid_config(word_list, &entries)
}

/// Generate a grid config from a string template, with `#` representing blocks and `.` or `_`
/// representing open cells. Every run of two or more open cells becomes a slot.
pub fn generate_grid_config_from_template_string(
    word_list: &[String],
    template: &str,
) -> Result<GridConfig, GridConfigError> {
    let rows: Vec<Vec<char>> = template
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(line.chars().collect())
            }
        })
        .collect();

    let width = rows.first().map_or(0, Vec::len);
    let mut open_cells: Vec<Vec<bool>> = Vec::with_capacity(rows.len());

    for (y, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(GridConfigError::RaggedTemplate {
                row: y,
                expected: width,
                found: row.len(),
            });
        }

        let mut open_row = Vec::with_capacity(width);
        for (x, &cell) in row.iter().enumerate() {
            open_row.push(match cell {
                '#' => false,
                '.' | '_' => true,
                other => {
                    return Err(GridConfigError::InvalidTemplateCell {
                        row: y,
                        col: x,
                        cell: other,
                    })
                }
            });
        }
        open_cells.push(open_row);
    }

    fn build_runs(open_cells: &[Vec<bool>]) -> Vec<Vec<GridCoord>> {
        let mut result: Vec<Vec<GridCoord>> = vec![];

        for (y, line) in open_cells.iter().enumerate() {
            let mut current_run: Vec<GridCoord> = vec![];

            for (x, &open) in line.iter().enumerate() {
                if open {
                    current_run.push((x, y));
                } else {
                    if current_run.len() > 1 {
                        result.push(current_run);
                    }
                    current_run = vec![];
                }
            }

            if current_run.len() > 1 {
                result.push(current_run);
            }
        }

        result
    }

    let mut entries: Vec<GridEntry> = vec![];

    for coords in build_runs(&open_cells) {
        entries.push(GridEntry {
            loc: coords[0],
            len: coords.len(),
            dir: Direction::Across,
        });
    }

    let transposed: Vec<Vec<bool>> = (0..width)
        .map(|x| open_cells.iter().map(|row| row[x]).collect())
        .collect();

    for coords in build_runs(&transposed) {
        let (y, x) = coords[0];
        entries.push(GridEntry {
            loc: (x, y),
            len: coords.len(),
            dir: Direction::Down,
        });
    }

    let mut grid_config = generate_grid_config(word_list, &entries)?;

    // Keep any all-block rows or columns at the edges when rendering.
    grid_config.width = width;
    grid_config.height = rows.len();

    Ok(grid_config)
}

/// Parse a word list with one word per line. Blank lines are skipped, and anything after a `;` or
/// `,` (such as a score column) is ignored.
#[must_use]
pub fn parse_word_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let word = line.split([';', ',']).next().unwrap_or("").trim();
            if word.is_empty() {
                None
            } else {
                Some(word.to_uppercase())
            }
        })
        .collect()
}

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// Turn the given grid config and fill choices into a rendered string. Cells that aren't part of
/// any slot are shown as `#`, and cells in unfilled slots as `.`.
#[must_use]
pub fn render_grid(config: &GridConfig, choices: &[Choice]) -> String {
    let mut grid: Vec<Vec<char>> = vec![vec!['#'; config.width]; config.height];

    for slot_config in &config.slot_configs {
        for (x, y) in slot_config.cell_coords() {
            grid[y][x] = '.';
        }
    }

    for &Choice { slot_id, word_id } in choices {
        let slot_config = &config.slot_configs[slot_id];
        let word = &config.words[word_id];

        for ((x, y), &glyph) in slot_config.cell_coords().into_iter().zip(&word.glyphs) {
            grid[y][x] = config.glyphs[glyph];
        }
    }

    grid.iter()
        .map(|row| row.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
