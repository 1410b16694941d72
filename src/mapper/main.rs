use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use cscr::{db::constants, db::Database, mapping};

/// Maps scraped handles to USNs and maintains the player database.
#[derive(clap::Parser)]
struct Args {
    /// Player database (TinyDB JSON).
    #[arg(long, env = "CSCR_DB_FILE", default_value = constants::DB_FILE, global = true)]
    db: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Replace handles with USNs in every rank file and log the unmapped ones.
    Map {
        #[arg(long, env = "CSCR_RANKS_DIR", default_value = constants::RANKS_DIR)]
        ranks_dir: PathBuf,
        /// Write mapped files here instead of in place.
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long, env = "CSCR_UNMAPPED_FILE", default_value = constants::UNMAPPED_FILE)]
        unmapped: PathBuf,
    },
    /// Reset every player's rating state.
    Reset,
    /// Export the rated players as a CSV scoreboard.
    Export {
        #[arg(long, env = "CSCR_SCOREBOARD_FILE", default_value = constants::SCOREBOARD_FILE)]
        output: PathBuf,
    },
    /// Check every record for malformed or conflicting fields.
    Check,
    /// Print the ranks a (mapped) rank file assigns to known players.
    Ranks {
        #[arg(value_name = "file")]
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_timed();

    let args = Args::parse();

    match args.command {
        Commands::Map {
            ranks_dir,
            output_dir,
            unmapped,
        } => {
            let db = Database::open(&args.db)?;
            let summary = mapping::map_directory(&db, &ranks_dir, output_dir.as_deref(), &unmapped)?;
            tracing::info!(
                target: "mapper",
                "{} files mapped, {} skipped, {} unmapped handles logged to {}",
                summary.mapped,
                summary.skipped,
                summary.unmapped,
                unmapped.display(),
            );
        }
        Commands::Reset => {
            let mut db = Database::open(&args.db)?;
            db.reset();
            db.save()?;
            tracing::info!(target: "db", "successfully reset database and stored in {}", db.path().display());
        }
        Commands::Export { output } => {
            let db = Database::open(&args.db)?;
            let mut writer = BufWriter::new(File::create(&output)?);
            let n = db.export_csv(&mut writer)?;
            writer.flush()?;
            tracing::info!(target: "db", "exported {n} players to {}", output.display());
        }
        Commands::Check => {
            let n = Database::open(&args.db)?.check()?;
            tracing::info!(target: "db", "{n} players, all good");
        }
        Commands::Ranks { file } => {
            let db = Database::open(&args.db)?;
            let text = std::fs::read_to_string(&file)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for (usn, rank) in mapping::known_ranks(&db, &text) {
                writeln!(out, "{rank}\t{usn}")?;
            }
        }
    }

    Ok(())
}
