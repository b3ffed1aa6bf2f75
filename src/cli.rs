use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Nutrition or fitness goal to plan meals for
    #[arg(short, long)]
    pub goal: String,

    /// How many meals to recommend
    #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub num_meals: u32,

    /// Directory holding the recipe snapshot CSV files
    #[arg(long, default_value = "dataset")]
    pub dataset_dir: PathBuf,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
