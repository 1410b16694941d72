use std::{sync::LazyLock, time::SystemTime};

use cscr::{
    row::ScoreboardRow,
    util::{parse_rank, parse_score, server_date, text_of},
};
use reqwest::Client as Request;
use scraper::{Html, Selector};

pub const DEFAULT_URL: &str =
    "https://www.hackerearth.com/challenges/competitive/{contest}/leaderboard/page/{page}/";

static SEL_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.leaderboard tbody tr").unwrap());
static SEL_RANK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td.rank").unwrap());
static SEL_PROFILE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/@"]"#).unwrap());
static SEL_SCORE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td.score").unwrap());

pub struct Context {
    pub client: Request,
    pub url: String,
    pub contest: String,
}

#[must_use]
pub fn page_url(template: &str, contest: &str, page: u32) -> String {
    template
        .replace("{contest}", contest)
        .replace("{page}", &page.to_string())
}

/// `/@handle/` or `https://www.hackerearth.com/@handle?ref=lb` -> `handle`.
fn handle_from_href(href: &str) -> Option<&str> {
    let (_, rest) = href.split_once("/@")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let handle = &rest[..end];
    (!handle.is_empty()).then_some(handle)
}

/// Leaderboard rows on one page. Rows missing a rank or a profile link
/// (headers, ads, "load more") are skipped.
pub fn parse_page(html: &str) -> Vec<ScoreboardRow> {
    let document = Html::parse_document(html);
    document
        .select(&SEL_ROW)
        .filter_map(|tr| {
            let rank = parse_rank(&text_of(tr.select(&SEL_RANK).next()?))?;
            let handle = handle_from_href(tr.select(&SEL_PROFILE).next()?.attr("href")?)?;
            let score = tr
                .select(&SEL_SCORE)
                .next()
                .and_then(|td| parse_score(&text_of(td)));
            Some(ScoreboardRow::new(rank, handle, score))
        })
        .collect()
}

pub async fn fetch(page: u32, ctx: &Context) -> anyhow::Result<(String, Option<SystemTime>)> {
    let url = page_url(&ctx.url, &ctx.contest, page);
    tracing::info!(target: "worker", "[Page #{page}] {url}");

    let res = ctx.client.get(&url).send().await?.error_for_status()?;
    let date = server_date(res.headers());
    Ok((res.text().await?, date))
}
