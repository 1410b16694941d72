use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    db::constants::RANKS_DIR,
    ranklist,
    row::{ScoreboardRow, Site},
};

/// Where a scraper puts its rows.
#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Directory receiving `<site>-<contest>.in`.
    #[arg(long, env = "CSCR_OUTPUT_DIR", default_value = RANKS_DIR)]
    pub output_dir: PathBuf,
    /// Exact rank file path, overriding `--output-dir`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Also dump the rows (with scores) as JSON.
    #[arg(long, value_name = "file")]
    pub json: Option<PathBuf>,
}

/// `<site>-<contest>.in`, with anything that would break the name convention
/// or the path squashed to `_`.
#[must_use]
pub fn rank_file_name(site: Site, contest: &str) -> String {
    let contest = contest
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect::<String>();
    format!("{site}-{contest}.in")
}

impl OutputArgs {
    #[must_use]
    pub fn rank_file(&self, site: Site, contest: &str) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.output_dir.join(rank_file_name(site, contest)))
    }

    /// Writes the rank file (and the JSON dump if asked for), returning the
    /// rank file path.
    pub fn emit(&self, site: Site, contest: &str, rows: &[ScoreboardRow]) -> anyhow::Result<PathBuf> {
        let path = self.rank_file(site, contest);
        write_file(&path, ranklist::render(rows).as_bytes())?;
        tracing::info!(target: "output", "\x1b[36m{} rows\x1b[0m -> {}", rows.len(), path.display());

        if let Some(json) = &self.json {
            write_file(json, &serde_json::to_vec_pretty(rows)?)?;
            tracing::info!(target: "output", "json -> {}", json.display());
        }

        Ok(path)
    }
}

fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
