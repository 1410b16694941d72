//! When to stop walking a paginated scoreboard.

use core::{future::Future, time::Duration};

use compact_str::CompactString;
use tokio::time::{Instant, sleep};

use crate::row::ScoreboardRow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Rows not seen before.
    New,
    /// No rows at all.
    Empty,
    /// Same first row as the previous page.
    Repeat,
}

/// Page counter plus the first row of the last accepted page.
#[derive(Debug)]
pub struct Pager {
    page: u32,
    cap: Option<u32>,
    previous_first: Option<(u32, CompactString)>,
}

impl Pager {
    /// `cap` limits the number of pages accepted.
    #[must_use]
    pub const fn new(cap: Option<u32>) -> Self {
        Self {
            page: 1,
            cap,
            previous_first: None,
        }
    }

    /// Page being read, 1-based.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn check(&self, rows: &[ScoreboardRow]) -> Step {
        let Some(row) = rows.first() else {
            return Step::Empty;
        };
        let repeat = self
            .previous_first
            .as_ref()
            .is_some_and(|(rank, handle)| *rank == row.rank && *handle == row.handle);
        if repeat { Step::Repeat } else { Step::New }
    }

    /// Accepts `rows` as the current page. Returns `false` once the cap is
    /// reached.
    pub fn advance(&mut self, rows: &[ScoreboardRow]) -> bool {
        self.previous_first = rows.first().map(|row| (row.rank, row.handle.clone()));
        if self.cap.is_some_and(|cap| self.page >= cap) {
            return false;
        }
        self.page += 1;
        true
    }

    /// Reads the current page with `read` until it shows new rows or
    /// `timeout` runs out, for pages that re-render some time after the
    /// page turn. The last read is returned either way.
    pub async fn settle<F, Fut>(
        &self,
        timeout: Duration,
        period: Duration,
        mut read: F,
    ) -> anyhow::Result<Vec<ScoreboardRow>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<ScoreboardRow>>>,
    {
        let deadline = Instant::now() + timeout;
        loop {
            let rows = read().await?;
            if self.check(&rows) == Step::New || Instant::now() >= deadline {
                return Ok(rows);
            }
            tracing::debug!(target: "paging", "[Page #{}] not rendered yet", self.page);
            sleep(period).await;
        }
    }
}
