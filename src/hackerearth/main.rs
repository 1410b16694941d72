mod scrape;

use clap::Parser;
use cscr::{
    output::OutputArgs,
    paging::{Pager, Step},
    row::Site,
};

/// Scrapes the full, unfiltered global leaderboard of a HackerEarth contest.
#[derive(Parser)]
struct Args {
    /// Contest slug, as in `/challenges/competitive/<slug>/`.
    #[arg(short, long)]
    contest: String,
    /// Leaderboard page URL with `{contest}` and `{page}` placeholders.
    #[arg(long, default_value = scrape::DEFAULT_URL)]
    url: String,
    /// Stop after this many pages.
    #[arg(long)]
    pages: Option<u32>,
    /// Pause between pages, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    delay: u64,
    #[command(flatten)]
    output: OutputArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_timed();

    let args = Args::parse();

    let ctx = scrape::Context {
        client: cscr::scrape::basic()?,
        url: args.url,
        contest: args.contest,
    };

    let mut rows = Vec::new();
    let mut pager = Pager::new(args.pages);
    loop {
        let page = pager.page();
        let (html, date) = scrape::fetch(page, &ctx).await?;
        if let (1, Some(date)) = (page, date) {
            tracing::info!(target: "worker", "scraped at {}", httpdate::fmt_http_date(date));
        }

        let mut block = scrape::parse_page(&html);
        match pager.check(&block) {
            Step::New => (),
            Step::Empty => {
                tracing::info!(target: "worker", "[Page #{page}] empty, done");
                break;
            }
            Step::Repeat => {
                tracing::info!(target: "worker", "[Page #{page}] repeats the previous page, done");
                break;
            }
        }
        tracing::info!(target: "worker", "\x1b[36m[Page #{page}] {} rows\x1b[0m", block.len());
        let more = pager.advance(&block);
        rows.append(&mut block);

        if !more {
            break;
        }
        tokio::time::sleep(core::time::Duration::from_millis(args.delay)).await;
    }

    if rows.is_empty() {
        anyhow::bail!("leaderboard of {} is empty", ctx.contest);
    }

    args.output.emit(Site::HackerEarth, &ctx.contest, &rows)?;
    Ok(())
}
