use core::{fmt, str::FromStr};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Contest platforms a player may hold a handle on.
///
/// The lowercase name doubles as the field name in the player store and as
/// the prefix of rank file names (`codechef-COOK101.in`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    CodeJam,
    Kickstart,
    HackerEarth,
    HackerRank,
    Facebook,
    CodeChef,
    Codeforces,
}

impl Site {
    pub const ALL: [Self; 7] = [
        Self::CodeJam,
        Self::Kickstart,
        Self::HackerEarth,
        Self::HackerRank,
        Self::Facebook,
        Self::CodeChef,
        Self::Codeforces,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CodeJam => "codejam",
            Self::Kickstart => "kickstart",
            Self::HackerEarth => "hackerearth",
            Self::HackerRank => "hackerrank",
            Self::Facebook => "facebook",
            Self::CodeChef => "codechef",
            Self::Codeforces => "codeforces",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Site {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|site| site.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown site {s:?}"))
    }
}

/// One contestant's line on a scoreboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardRow {
    pub rank: u32,
    pub handle: CompactString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl ScoreboardRow {
    pub fn new(rank: u32, handle: impl Into<CompactString>, score: Option<f64>) -> Self {
        Self {
            rank,
            handle: handle.into(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_names_round_trip() {
        for site in Site::ALL {
            assert_eq!(site.as_str().parse::<Site>().unwrap(), site);
        }
    }

    #[test]
    fn site_parse_is_exact() {
        assert!("CodeChef".parse::<Site>().is_err());
        assert!("topcoder".parse::<Site>().is_err());
        assert!("".parse::<Site>().is_err());
    }

    #[test]
    fn row_json_omits_missing_score() {
        let row = ScoreboardRow::new(3, "tourist", None);
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"rank":3,"handle":"tourist"}"#
        );
    }
}
