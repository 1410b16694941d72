use core::time::Duration;

use rand::seq::IndexedRandom;
use reqwest::Client as Request;

mod puppeteer;

pub use puppeteer::{click_next, first_tab, navigate_to, puppeteer, wait_for_html};

pub static USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0",
];

/// Plain HTTP client for pages that render server side.
pub fn basic() -> reqwest::Result<Request> {
    let user_agent = USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0]);
    tracing::debug!(target: "client", "user-agent \x1b[1;36m{user_agent}\x1b[0m");

    Request::builder()
        .connect_timeout(const { Duration::from_secs(8) })
        .timeout(const { Duration::from_secs(60) })
        .user_agent(user_agent)
        .build()
}
