use std::{sync::LazyLock, time::Duration};

use cscr::{
    row::ScoreboardRow,
    util::{first_text, parse_rank, parse_score, text_of},
};
use scraper::{Html, Selector};

pub const TABLE: &str = ".ranking-table";
pub const NEXT_PAGE: &str = ".ranking-table-pagination button.ranking-table-pagination__next";
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(60);
pub const PAGE_TURN_TIMEOUT: Duration = Duration::from_secs(20);
pub const POLL_PERIOD: Duration = Duration::from_millis(500);

static SEL_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".ranking-table__row").unwrap());
static SEL_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".ranking-table__row-cell").unwrap());
static SEL_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".ranking-table__row-cell__displayname").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Platform {
    Codejam,
    Kickstart,
}

impl Platform {
    #[must_use]
    pub const fn site(self) -> cscr::row::Site {
        match self {
            Self::Codejam => cscr::row::Site::CodeJam,
            Self::Kickstart => cscr::row::Site::Kickstart,
        }
    }
}

#[must_use]
pub fn round_url(platform: Platform, round: &str) -> String {
    format!(
        "https://codingcompetitions.withgoogle.com/{}/round/{round}",
        platform.site()
    )
}

/// Rows of one rendered scoreboard page: rank cell, display name cell, score
/// cell. The header row carries no display name and drops out.
pub fn parse_page(html: &str) -> Vec<ScoreboardRow> {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&SEL_ROW)
        .filter_map(|row| {
            let mut cells = row.select(&SEL_CELL);
            let rank = parse_rank(&text_of(cells.next()?))?;
            let handle = text_of(row.select(&SEL_NAME).next()?);
            if handle.is_empty() {
                return None;
            }
            let score = cells.nth(1).and_then(first_text).and_then(parse_score);
            Some(ScoreboardRow::new(rank, handle, score))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="ranking-table">
          <div class="ranking-table__header ranking-table__row">
            <span class="ranking-table__row-cell">Rank</span>
            <span class="ranking-table__row-cell">Participant</span>
            <span class="ranking-table__row-cell">Score</span>
          </div>
          <div class="ranking-table__row">
            <span class="ranking-table__row-cell ranking-table__row-cell--left">1</span>
            <span class="ranking-table__row-cell">
              <img class="flag" alt="BY"><p class="ranking-table__row-cell__displayname">Gennady.Korotkevich</p>
            </span>
            <span class="ranking-table__row-cell">100 <small>1:02:03</small></span>
          </div>
          <div class="ranking-table__row">
            <span class="ranking-table__row-cell ranking-table__row-cell--left">2</span>
            <span class="ranking-table__row-cell"><p class="ranking-table__row-cell__displayname">ksun48</p></span>
            <span class="ranking-table__row-cell">100</span>
          </div>
          <div class="ranking-table__row">
            <span class="ranking-table__row-cell">3</span>
            <span class="ranking-table__row-cell"><p class="ranking-table__row-cell__displayname"> </p></span>
            <span class="ranking-table__row-cell">90</span>
          </div>
          <div class="ranking-table__row">
            <span class="ranking-table__row-cell">4</span>
            <span class="ranking-table__row-cell"><p class="ranking-table__row-cell__displayname">Benq</p></span>
          </div>
        </div>
    "#;

    #[test]
    fn parses_rows() {
        assert_eq!(
            parse_page(PAGE),
            [
                ScoreboardRow::new(1, "Gennady.Korotkevich", Some(100.0)),
                ScoreboardRow::new(2, "ksun48", Some(100.0)),
                ScoreboardRow::new(4, "Benq", None),
            ]
        );
    }

    #[test]
    fn urls() {
        assert_eq!(
            round_url(Platform::Kickstart, "0000000000050e01"),
            "https://codingcompetitions.withgoogle.com/kickstart/round/0000000000050e01"
        );
        assert_eq!(Platform::Codejam.site(), cscr::row::Site::CodeJam);
    }
}
