mod scrape;

use clap::Parser;
use cscr::{
    output::OutputArgs,
    paging::{Pager, Step},
    scrape as browser,
};
use scrape::Platform;

/// Reads a Code Jam / Kickstart scoreboard through a Chrome session.
#[derive(Parser)]
struct Args {
    /// Round id, the last path segment of the scoreboard URL.
    #[arg(short, long)]
    round: String,
    #[arg(long, value_enum, default_value_t = Platform::Codejam)]
    platform: Platform,
    /// Stop after this many scoreboard pages.
    #[arg(long)]
    pages: Option<u32>,
    /// Run Chrome without a window.
    #[arg(long)]
    headless: bool,
    /// HTTP proxy for the browser, `host:port`.
    #[arg(long, env = "CSCR_PROXY")]
    proxy: Option<String>,
    /// Contest name used in the rank file name; defaults to the round id.
    #[arg(short, long)]
    contest: Option<String>,
    #[command(flatten)]
    output: OutputArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_timed();

    let args = Args::parse();

    let chrome = browser::puppeteer(args.headless, args.proxy.map(|p| format!("http://{p}")))?;
    let tab = &browser::first_tab(&chrome)?;

    let url = scrape::round_url(args.platform, &args.round);
    tracing::info!(target: "codejam", "opening {url}");
    browser::navigate_to(tab, url).await?;

    let read = || async move {
        let html = browser::wait_for_html(tab, scrape::TABLE, scrape::RENDER_TIMEOUT).await?;
        Ok::<_, anyhow::Error>(scrape::parse_page(&html))
    };

    let mut rows = Vec::new();
    let mut pager = Pager::new(args.pages);
    loop {
        let page = pager.page();
        // the table re-renders in place after a page turn
        let mut block = pager
            .settle(scrape::PAGE_TURN_TIMEOUT, scrape::POLL_PERIOD, read)
            .await?;

        match pager.check(&block) {
            Step::New => (),
            Step::Empty => {
                tracing::info!(target: "codejam", "[Page #{page}] empty, done");
                break;
            }
            Step::Repeat => {
                tracing::warn!(target: "codejam", "[Page #{page}] still shows the previous page, done");
                break;
            }
        }
        tracing::info!(target: "codejam", "\x1b[36m[Page #{page}] {} rows\x1b[0m", block.len());
        let more = pager.advance(&block);
        rows.append(&mut block);

        if !more {
            break;
        }
        if !browser::click_next(tab, scrape::NEXT_PAGE).await? {
            tracing::info!(target: "codejam", "[Page #{page}] last page");
            break;
        }
    }

    if rows.is_empty() {
        anyhow::bail!("scoreboard of round {} is empty", args.round);
    }

    let contest = args.contest.as_deref().unwrap_or(&args.round);
    args.output.emit(args.platform.site(), contest, &rows)?;
    Ok(())
}
