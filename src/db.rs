//! Player store: a TinyDB-compatible JSON file.
//!
//! ```json
//! {"_default": {"1": {"usn": "PES1201700001", "name": "Ada", "codechef": "ada_l", ...}}}
//! ```

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::Context as _;
use compact_str::CompactString;
use hashbrown::HashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use unicase::UniCase;

use crate::row::Site;

pub mod constants {
    macro_rules! env_or_default {
        ($name:expr, $default:expr) => {
            if let Some(s) = option_env!($name) {
                s
            } else {
                $default
            }
        };
    }

    pub const DB_FILE: &str = env_or_default!("CSCR_DB_FILE", "database/db.json");
    pub const RANKS_DIR: &str = env_or_default!("CSCR_RANKS_DIR", "database/contest_ranks");
    pub const UNMAPPED_FILE: &str =
        env_or_default!("CSCR_UNMAPPED_FILE", "database/unmapped_handles.out");
    pub const SCOREBOARD_FILE: &str = env_or_default!("CSCR_SCOREBOARD_FILE", "scoreboard.csv");

    pub const DEFAULT_RATING: f64 = 1500.0;
    pub const DEFAULT_VOLATILITY: f64 = 125.0;
    pub const LAST_FIVE: u32 = 5;

    pub const VALID_MIN_YEAR: i32 = 2018;
    pub const VALID_MAX_YEAR: i32 = 2022;
}

pub static VALID_USN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((1PI14\w{2}\d{3})|(01FB1([4567])\w{3}\d{3})|(PES12017\d{5}))$").unwrap()
});
static VALID_EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^@]+@[^@]+$").unwrap());
static VALID_USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w_\-.]{3,}$").unwrap());
static VALID_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][a-z]*\s)*[A-Z][a-z]*$").unwrap());

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub usn: CompactString,
    pub name: String,
    pub email: String,
    /// Year of graduation.
    pub year: i32,
    pub rating: f64,
    pub volatility: f64,
    #[serde(rename = "timesPlayed")]
    pub times_played: u32,
    /// Best rating so far.
    pub best: f64,
    /// Contests left before an absent player's rating decays.
    #[serde(rename = "lastFive")]
    pub last_five: u32,
    /// Site handles and anything else the file carries.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Player {
    #[must_use]
    pub fn handle(&self, site: Site) -> Option<&str> {
        self.extra.get(site.as_str()).and_then(Value::as_str)
    }

    pub fn set_handle(&mut self, site: Site, handle: &str) {
        self.extra
            .insert(site.as_str().to_owned(), Value::String(handle.to_owned()));
    }

    pub fn reset(&mut self) {
        use constants::{DEFAULT_RATING, DEFAULT_VOLATILITY, LAST_FIVE};

        self.rating = DEFAULT_RATING;
        self.volatility = DEFAULT_VOLATILITY;
        self.best = DEFAULT_RATING;
        self.times_played = 0;
        self.last_five = LAST_FIVE;
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(rename = "_default", default)]
    players: BTreeMap<String, Player>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

/// Handle → USN for a single site. Handles compare case-insensitively.
pub type HandleMap = HashMap<UniCase<CompactString>, CompactString>;

pub struct Database {
    path: PathBuf,
    doc: Document,
}

impl Database {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
        let doc = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse {}", path.display()))?;
        Ok(Self { path, doc })
    }

    pub fn from_json(path: impl Into<PathBuf>, json: &str) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.into(),
            doc: serde_json::from_str(json)?,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a sibling temporary file and renames it over the store, so a
    /// failed write leaves the previous contents in place.
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let file = NamedTempFile::new_in(dir)
            .with_context(|| format!("create temporary file in {}", dir.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.doc)?;
        let file = writer.into_inner().map_err(std::io::IntoInnerError::into_error)?;
        file.persist(&self.path)
            .map_err(|x| x.error)
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.doc.players.values()
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.doc.players.values_mut()
    }

    #[must_use]
    pub fn contains_usn(&self, usn: &str) -> bool {
        self.players().any(|p| p.usn == usn)
    }

    #[must_use]
    pub fn handle_map(&self, site: Site) -> HandleMap {
        self.players()
            .filter_map(|p| {
                let handle = p.handle(site)?;
                Some((UniCase::new(CompactString::new(handle)), p.usn.clone()))
            })
            .collect()
    }

    /// Puts every player back to the initial rating state.
    pub fn reset(&mut self) {
        self.players_mut().for_each(Player::reset);
    }

    /// Writes the human-readable scoreboard: players who have played at least
    /// once, best rating first.
    pub fn export_csv<W: Write>(&self, mut w: W) -> std::io::Result<usize> {
        let mut players = self.players().filter(|p| p.times_played > 0).collect::<Vec<_>>();
        players.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        write_row(
            &mut w,
            &["Rank", "USN", "Name", "Graduation Year", "Contests", "Rating", "Best"],
        )?;
        for (rank, p) in players.iter().enumerate() {
            write_row(
                &mut w,
                &[
                    (rank + 1).to_string().as_str(),
                    p.usn.as_str(),
                    p.name.as_str(),
                    p.year.to_string().as_str(),
                    p.times_played.to_string().as_str(),
                    (p.rating.round_ties_even() as i64).to_string().as_str(),
                    (p.best.round_ties_even() as i64).to_string().as_str(),
                ],
            )?;
        }
        Ok(players.len())
    }

    /// Checks every record against the store's format rules.
    #[must_use]
    pub fn validate(&self) -> Vec<Problem> {
        use constants::{VALID_MAX_YEAR, VALID_MIN_YEAR};

        let mut problems = Vec::new();
        let mut claimed = HashMap::<(Site, UniCase<CompactString>), &str>::new();

        for p in self.players() {
            let mut report = |what: String| {
                problems.push(Problem {
                    usn: p.usn.clone(),
                    what,
                });
            };

            if !VALID_USN.is_match(&p.usn) {
                report("invalid usn".to_owned());
            }
            if !VALID_NAME.is_match(&p.name) {
                report(format!("invalid name {:?}", p.name));
            }
            if !VALID_EMAIL.is_match(&p.email) {
                report(format!("invalid email {:?}", p.email));
            }
            if !(VALID_MIN_YEAR..=VALID_MAX_YEAR).contains(&p.year) {
                report(format!("graduation year {} out of range", p.year));
            }
            for site in Site::ALL {
                let Some(value) = p.extra.get(site.as_str()) else {
                    continue;
                };
                let Some(handle) = value.as_str() else {
                    report(format!("{site} handle is not a string: {value}"));
                    continue;
                };
                if !VALID_USERNAME.is_match(handle) {
                    report(format!("invalid {site} handle {handle:?}"));
                }
                let key = (site, UniCase::new(CompactString::new(handle)));
                if let Some(owner) = claimed.insert(key, &p.usn) {
                    report(format!("{site} handle {handle:?} also claimed by {owner}"));
                }
            }
        }

        problems
    }

    /// Logs every problem found by [`Database::validate`] and fails if there
    /// is any. Returns the number of players checked.
    pub fn check(&self) -> anyhow::Result<usize> {
        let problems = self.validate();
        for problem in &problems {
            tracing::warn!(target: "db", "\x1b[31m{}\x1b[0m: {}", problem.usn, problem.what);
        }
        if !problems.is_empty() {
            anyhow::bail!("{} problems in {}", problems.len(), self.path.display());
        }
        Ok(self.players().count())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Problem {
    pub usn: CompactString,
    pub what: String,
}

fn write_row<W: Write>(w: &mut W, row: &[&str]) -> std::io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if cell.contains([',', '"', '\n', '\r']) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}
