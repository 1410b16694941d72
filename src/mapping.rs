//! Rewrites rank files so that they hold USNs instead of site handles.
//!
//! Past ranks then survive a contestant renaming themselves on the site: only
//! the handle stored in the player database has to change.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use compact_str::CompactString;
use hashbrown::HashMap;
use unicase::UniCase;

use crate::{
    db::{Database, HandleMap, VALID_USN},
    ranklist,
    row::Site,
};

/// Site named by a rank file, `<site>-<contest-details>.in`.
#[must_use]
pub fn site_from_file_name(file_name: &str) -> Option<Site> {
    let (site, _) = file_name.split_once('-')?;
    site.parse().ok()
}

/// Handle → USN replacement over rank file text, one site map cached per run.
pub struct Mapper<'db> {
    db: &'db Database,
    maps: HashMap<Site, HandleMap>,
}

impl<'db> Mapper<'db> {
    #[must_use]
    pub fn new(db: &'db Database) -> Self {
        Self {
            db,
            maps: HashMap::new(),
        }
    }

    fn handles(&mut self, site: Site) -> &HandleMap {
        let db = self.db;
        self.maps.entry(site).or_insert_with(|| {
            let map = db.handle_map(site);
            tracing::debug!(target: "mapper", "{site}: {} known handles", map.len());
            map
        })
    }

    /// Replaces every whole token that is a known `site` handle. Line
    /// structure is kept, so tied ranks stay tied.
    pub fn map_text(&mut self, site: Site, text: &str) -> String {
        let handles = self.handles(site);
        let mut out = String::with_capacity(text.len());
        for line in text.lines() {
            for (i, token) in line.split_whitespace().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                match handles.get(&UniCase::new(CompactString::new(token))) {
                    Some(usn) => out.push_str(usn),
                    None => out.push_str(token),
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Tokens still not looking like a USN after mapping, counted per site.
#[derive(Default)]
pub struct Unmapped {
    counts: HashMap<(Site, CompactString), usize>,
}

impl Unmapped {
    pub fn record(&mut self, site: Site, mapped_text: &str) {
        for token in mapped_text.split_whitespace() {
            if !VALID_USN.is_match(token) {
                *self.counts.entry((site, token.into())).or_default() += 1;
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Most common first, ties in name order (site name, then handle).
    #[must_use]
    pub fn most_common(&self) -> Vec<(Site, &str, usize)> {
        let mut entries = self
            .counts
            .iter()
            .map(|((site, handle), &n)| (*site, handle.as_str(), n))
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| {
            b.2.cmp(&a.2)
                .then_with(|| a.0.as_str().cmp(b.0.as_str()))
                .then_with(|| a.1.cmp(b.1))
        });
        entries
    }

    /// Distinct count on the first line, then `site handle count` per line.
    pub fn write<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "{}", self.len())?;
        for (site, handle, n) in self.most_common() {
            writeln!(w, "{site} {handle} {n}")?;
        }
        Ok(())
    }
}

/// `(usn, rank)` for the players of `db` found in mapped rank file text, each
/// at its last rank. Other tokens are logged and dropped.
#[must_use]
pub fn known_ranks(db: &Database, text: &str) -> Vec<(CompactString, u32)> {
    ranklist::last_ranks(text)
        .into_iter()
        .filter(|(token, _)| {
            let known = db.contains_usn(token);
            if !known {
                tracing::info!(target: "ranks", "ignoring {token}");
            }
            known
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct Summary {
    pub mapped: usize,
    pub skipped: usize,
    pub unmapped: usize,
}

/// Maps every rank file in `ranks_dir`, writing results into `output_dir`
/// (in place when `None`) and the unmapped report into `unmapped_file`.
pub fn map_directory(
    db: &Database,
    ranks_dir: &Path,
    output_dir: Option<&Path>,
    unmapped_file: &Path,
) -> anyhow::Result<Summary> {
    let mut entries = fs::read_dir(ranks_dir)
        .with_context(|| format!("read {}", ranks_dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<PathBuf>, _>>()?;
    entries.sort();

    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)?;
    }

    let mut mapper = Mapper::new(db);
    let mut unmapped = Unmapped::default();
    let mut summary = Summary::default();

    for path in entries.into_iter().filter(|p| p.is_file()) {
        let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(site) = site_from_file_name(file_name) else {
            tracing::error!(target: "mapper", "invalid file name {file_name:?}, expected 'site-contest-details.in'");
            summary.skipped += 1;
            continue;
        };

        let input = match fs::read_to_string(&path) {
            Ok(input) => input,
            Err(e) => {
                tracing::error!(target: "mapper", "cannot read {file_name:?}: {e}");
                summary.skipped += 1;
                continue;
            }
        };
        let output = mapper.map_text(site, &input);
        unmapped.record(site, &output);

        let target = output_dir.map_or_else(|| path.clone(), |dir| dir.join(file_name));
        fs::write(&target, output).with_context(|| format!("write {}", target.display()))?;
        tracing::info!(target: "mapper", "\x1b[36m{file_name}\x1b[0m mapped ({site})");
        summary.mapped += 1;
    }

    if let Some(parent) = unmapped_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(unmapped_file)
        .with_context(|| format!("create {}", unmapped_file.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    unmapped.write(&mut writer)?;
    writer.flush()?;
    summary.unmapped = unmapped.len();

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB: &str = r#"{"_default": {
        "1": {"usn": "PES1201700001", "name": "Ada", "email": "a@b", "year": 2021,
              "rating": 1500, "volatility": 125, "timesPlayed": 0, "best": 1500, "lastFive": 5,
              "codechef": "ada", "hackerearth": "ada_he"},
        "2": {"usn": "PES1201700002", "name": "Alan", "email": "a@b", "year": 2021,
              "rating": 1500, "volatility": 125, "timesPlayed": 0, "best": 1500, "lastFive": 5,
              "codechef": "adam"}
    }}"#;

    fn db() -> Database {
        Database::from_json("db.json", DB).unwrap()
    }

    #[test]
    fn file_name_convention() {
        assert_eq!(site_from_file_name("codechef-COOK101-div2.in"), Some(Site::CodeChef));
        assert_eq!(site_from_file_name("kickstart-2019-A.in"), Some(Site::Kickstart));
        assert_eq!(site_from_file_name("codechef.in"), None);
        assert_eq!(site_from_file_name("topcoder-srm.in"), None);
    }

    #[test]
    fn replaces_whole_tokens_only() {
        let db = db();
        let mut mapper = Mapper::new(&db);
        // "ada" is a prefix of "adam" and of "adamant"; neither may be touched
        // by the shorter handle.
        let out = mapper.map_text(Site::CodeChef, "adam ada\nadamant\nADA\n");
        assert_eq!(out, "PES1201700002 PES1201700001\nadamant\nPES1201700001\n");
    }

    #[test]
    fn other_sites_handles_are_ignored() {
        let db = db();
        let mut mapper = Mapper::new(&db);
        assert_eq!(mapper.map_text(Site::CodeChef, "ada_he\n"), "ada_he\n");
        assert_eq!(mapper.map_text(Site::HackerEarth, "ada_he\n"), "PES1201700001\n");
    }

    #[test]
    fn mapping_is_idempotent() {
        let db = db();
        let mut mapper = Mapper::new(&db);
        let once = mapper.map_text(Site::CodeChef, "ada x\nadam\n");
        let twice = mapper.map_text(Site::CodeChef, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn unmapped_report() {
        let mut unmapped = Unmapped::default();
        unmapped.record(Site::CodeChef, "PES1201700001 zed\nbob zed\n");
        unmapped.record(Site::CodeJam, "bob\n");
        let mut out = Vec::new();
        unmapped.write(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "3\ncodechef zed 2\ncodechef bob 1\ncodejam bob 1\n"
        );
    }

    #[test]
    fn unmapped_ties_follow_site_name() {
        let mut unmapped = Unmapped::default();
        unmapped.record(Site::Kickstart, "bob\n");
        unmapped.record(Site::CodeJam, "bob\n");
        unmapped.record(Site::CodeChef, "bob\n");
        unmapped.record(Site::CodeChef, "amy\n");
        let order = unmapped
            .most_common()
            .into_iter()
            .map(|(site, handle, _)| (site.as_str(), handle))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            [("codechef", "amy"), ("codechef", "bob"), ("codejam", "bob"), ("kickstart", "bob")]
        );
    }

    #[test]
    fn known_ranks_drop_strangers_and_repeats() {
        let ranks = known_ranks(&db(), "PES1201700002 stranger\nPES1201700001\nPES1201700002\n");
        let got = ranks.iter().map(|(u, r)| (u.as_str(), *r)).collect::<Vec<_>>();
        assert_eq!(got, [("PES1201700001", 3), ("PES1201700002", 4)]);
    }

    #[test]
    fn maps_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let ranks = dir.path().join("ranks");
        fs::create_dir(&ranks).unwrap();
        fs::write(ranks.join("codechef-COOK101.in"), "adam stranger\nada\n").unwrap();
        fs::write(ranks.join("hackerearth-circuits.in"), "ada_he\n").unwrap();
        fs::write(ranks.join("notes.txt"), "ada\n").unwrap();
        let report = dir.path().join("out").join("unmapped.out");

        let summary = map_directory(&db(), &ranks, None, &report).unwrap();
        assert_eq!(summary.mapped, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.unmapped, 1);

        assert_eq!(
            fs::read_to_string(ranks.join("codechef-COOK101.in")).unwrap(),
            "PES1201700002 stranger\nPES1201700001\n"
        );
        assert_eq!(
            fs::read_to_string(ranks.join("hackerearth-circuits.in")).unwrap(),
            "PES1201700001\n"
        );
        assert_eq!(fs::read_to_string(ranks.join("notes.txt")).unwrap(), "ada\n");
        assert_eq!(fs::read_to_string(report).unwrap(), "1\ncodechef stranger 1\n");
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let ranks = dir.path().join("ranks");
        fs::create_dir(&ranks).unwrap();
        fs::write(ranks.join("codechef-A.in"), [0xff, 0xfe, b'\n']).unwrap();
        fs::write(ranks.join("codechef-B.in"), "ada ghost\n").unwrap();
        let report = dir.path().join("unmapped.out");

        let summary = map_directory(&db(), &ranks, None, &report).unwrap();
        assert_eq!(summary.mapped, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            fs::read_to_string(ranks.join("codechef-B.in")).unwrap(),
            "PES1201700001 ghost\n"
        );
        assert_eq!(fs::read_to_string(report).unwrap(), "1\ncodechef ghost 1\n");
    }

    #[test]
    fn output_dir_leaves_input_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let ranks = dir.path().join("ranks");
        let mapped = dir.path().join("mapped");
        fs::create_dir(&ranks).unwrap();
        fs::write(ranks.join("codechef-LTIME.in"), "ada\n").unwrap();

        map_directory(&db(), &ranks, Some(mapped.as_path()), &dir.path().join("u.out")).unwrap();
        assert_eq!(fs::read_to_string(ranks.join("codechef-LTIME.in")).unwrap(), "ada\n");
        assert_eq!(
            fs::read_to_string(mapped.join("codechef-LTIME.in")).unwrap(),
            "PES1201700001\n"
        );
    }
}
