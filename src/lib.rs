pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod grid_config;

pub use backtracking_search::{
    find_fill, find_fill_with_budget, FillFailure, FillSuccess, SearchBudget, Statistics,
};
pub use grid_config::{
    generate_grid_config, generate_grid_config_from_template_string, generate_square_grid_config,
    parse_word_list, render_grid, Choice, Direction, GridConfig, GridConfigError, GridEntry, Slot,
};

/// The expected maximum number of distinct characters appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
