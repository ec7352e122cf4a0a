use clap::Parser;
use fillgrid_csp::{
    find_fill_with_budget, generate_grid_config_from_template_string, parse_word_list,
    render_grid, FillFailure, SearchBudget,
};
use instant::Duration;
use std::fmt::{Debug, Formatter};
use std::fs;

/// fillgrid: fill a crossword structure with words from a list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the structure file, with # for blocks and _ or . for open cells
    structure: String,

    /// Path to the word list, one word per line
    words: String,

    /// Optional path to write the filled grid to
    output: Option<String>,

    /// Give up after visiting this many search states
    #[arg(long)]
    max_states: Option<u64>,

    /// Give up after this many seconds
    #[arg(long)]
    time_limit: Option<u64>,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let args = Args::parse();

    let structure = fs::read_to_string(&args.structure)
        .map_err(|_| Error(format!("Couldn't read file '{}'", args.structure)))?;
    let word_list = parse_word_list(
        &fs::read_to_string(&args.words)
            .map_err(|_| Error(format!("Couldn't read file '{}'", args.words)))?,
    );

    let grid_config = generate_grid_config_from_template_string(&word_list, &structure)
        .map_err(|err| Error(format!("Invalid structure: {err}")))?;

    let budget = SearchBudget {
        max_states: args.max_states,
        time_limit: args.time_limit.map(Duration::from_secs),
    };

    match find_fill_with_budget(&grid_config, budget) {
        Ok(result) => {
            let display_grid = render_grid(&grid_config, &result.choices);
            println!("{display_grid}");

            if let Some(output) = &args.output {
                fs::write(output, display_grid + "\n")
                    .map_err(|_| Error(format!("Couldn't write file '{output}'")))?;
            }
            Ok(())
        }
        Err(FillFailure::HardFailure) => {
            println!("No solution.");
            Ok(())
        }
        Err(failure) => Err(Error(format!("No solution: {failure}"))),
    }
}
