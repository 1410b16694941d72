use std::{ffi::OsStr, sync::Arc, time::Duration};

use headless_chrome::{Browser, Element, LaunchOptions, Tab, browser::tab::NoElementFound};
use tokio::{
    task::spawn_blocking,
    time::{Instant, sleep},
};

pub fn puppeteer(headless: bool, proxy: Option<String>) -> anyhow::Result<Browser> {
    Browser::new(LaunchOptions {
        args: vec![OsStr::new("--disable-blink-features=AutomationControlled")],
        headless,
        proxy_server: proxy.as_deref(),
        idle_browser_timeout: const { Duration::from_secs(300) },
        ..LaunchOptions::default()
    })
}

#[allow(clippy::significant_drop_tightening)]
pub fn first_tab(browser: &Browser) -> anyhow::Result<Arc<Tab>> {
    let tab = browser.new_tab()?;

    {
        let tabs_guard = browser
            .get_tabs()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        for remain in &*tabs_guard {
            if !Arc::ptr_eq(&tab, remain) {
                remain.close(true)?;
            }
        }
    }

    Ok(tab)
}

pub async fn navigate_to(tab: &Arc<Tab>, url: String) -> anyhow::Result<()> {
    let tab = Arc::clone(tab);

    spawn_blocking(move || -> anyhow::Result<()> {
        tab.navigate_to(&url)?.wait_until_navigated()?;
        Ok(())
    })
    .await?
}

/// Outer HTML of the first element matching `selector`, polling until it
/// shows up or `timeout` runs out.
pub async fn wait_for_html(
    tab: &Arc<Tab>,
    selector: &'static str,
    timeout: Duration,
) -> anyhow::Result<String> {
    const PERIOD: Duration = Duration::from_millis(1832 / 4);

    let deadline = Instant::now() + timeout;
    loop {
        let arc_tab = Arc::clone(tab);
        let result = spawn_blocking(move || -> anyhow::Result<String> {
            arc_tab.find_element(selector)?.get_content()
        })
        .await?;

        match result {
            Ok(html) => break Ok(html),
            Err(err) => {
                if !err.is::<NoElementFound>() {
                    break Err(err);
                }
            }
        }

        if Instant::now() >= deadline {
            anyhow::bail!("{selector:?} did not appear within {timeout:?}");
        }
        sleep(PERIOD).await;
    }
}

fn is_disabled(element: &Element<'_>) -> bool {
    element.attributes.as_deref().is_some_and(|attrs| {
        attrs.chunks(2).any(|kv| match kv {
            [k, _] if k == "disabled" => true,
            [k, v] if k == "aria-disabled" => v == "true",
            _ => false,
        })
    })
}

/// Clicks the pagination control matched by `selector`.
///
/// Returns `false` when there is no such control or it is disabled, i.e. the
/// last page has been reached.
pub async fn click_next(tab: &Arc<Tab>, selector: &'static str) -> anyhow::Result<bool> {
    let tab = Arc::clone(tab);

    spawn_blocking(move || -> anyhow::Result<bool> {
        let element = match tab.find_element(selector) {
            Ok(element) => element,
            Err(err) if err.is::<NoElementFound>() => return Ok(false),
            Err(err) => return Err(err),
        };
        if is_disabled(&element) {
            return Ok(false);
        }
        element.click()?;
        Ok(true)
    })
    .await?
}
