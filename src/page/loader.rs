use futures_util::future::join_all;
use reqwest::header::CACHE_CONTROL;

use super::{Page, PageEvents, PageSignal};

/// A shared HTML fragment and the placeholder it fills.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub path: String,
    pub placeholder: String,
}

impl Fragment {
    pub fn new(path: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            placeholder: placeholder.into(),
        }
    }

    /// Header and footer shared by every page of the site.
    pub fn site_chrome() -> Vec<Fragment> {
        vec![
            Fragment::new("components/header.html", "header-placeholder"),
            Fragment::new("components/footer.html", "footer-placeholder"),
        ]
    }
}

pub struct ComponentLoader {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl ComponentLoader {
    pub fn new(client: reqwest::Client, base_url: reqwest::Url) -> Self {
        Self { client, base_url }
    }

    /// Fetch all fragments concurrently, inject the ones that loaded, then
    /// announce [`PageSignal::ComponentsLoaded`] whatever the individual
    /// results. Returns how many fragments were injected.
    pub async fn load(&self, page: &Page, fragments: &[Fragment], events: &PageEvents) -> usize {
        let results = join_all(fragments.iter().map(|f| self.fetch(f))).await;

        let mut injected = 0;
        for (fragment, result) in fragments.iter().zip(results) {
            match result {
                Ok(html) => {
                    if page.inject(&fragment.placeholder, html).await {
                        injected += 1;
                    }
                }
                Err(e) => tracing::error!("{e}"),
            }
        }

        events.announce(PageSignal::ComponentsLoaded);
        injected
    }

    async fn fetch(&self, fragment: &Fragment) -> Result<String, String> {
        let mut url = self
            .base_url
            .join(&fragment.path)
            .map_err(|e| format!("Invalid fragment path {}: {e}", fragment.path))?;
        // Cache buster
        url.query_pairs_mut()
            .append_pair("v", &chrono::Utc::now().timestamp_millis().to_string());

        let resp = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| format!("Failed to load {}: {e}", fragment.path))?;

        if !resp.status().is_success() {
            return Err(format!("Failed to load {}", fragment.path));
        }

        resp.text()
            .await
            .map_err(|e| format!("Failed to read {}: {e}", fragment.path))
    }
}
