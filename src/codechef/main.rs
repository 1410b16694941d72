mod parse;

use std::path::PathBuf;

use clap::Parser;
use cscr::{output::OutputArgs, row::Site};

/// Extracts the ranking from a manually saved CodeChef rankings page.
#[derive(Parser)]
struct Args {
    /// The saved raw rankings response.
    #[arg(value_name = "input-file")]
    input: PathBuf,
    /// Contest code used in the rank file name; defaults to the input file stem.
    #[arg(short, long)]
    contest: Option<String>,
    #[command(flatten)]
    output: OutputArgs,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_timed();

    let args = Args::parse();

    let text = std::fs::read_to_string(&args.input)?;
    tracing::info!(target: "codechef", "{}: {} bytes", args.input.display(), text.len());

    let rows = parse::parse_rankings(&text);
    if rows.is_empty() {
        anyhow::bail!("no ranking rows found in {}", args.input.display());
    }

    let contest = match args.contest {
        Some(contest) => contest,
        None => args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("cannot derive a contest name, pass --contest"))?
            .to_owned(),
    };

    args.output.emit(Site::CodeChef, &contest, &rows)?;
    Ok(())
}
