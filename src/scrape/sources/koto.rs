//! Koto portfolio extractor.
//!
//! Scrapes the work index at <https://koto.studio/work>. Each project
//! is an anchor tile carrying the project link, the title in an `h2`,
//! and optionally a thumbnail video in a data attribute.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use scraper::{Html, Selector};
use url::Url;

use crate::scrape::normalize_title;
use crate::scrape::types::{Project, ProjectSource};

pub const WORK_URL: &str = "https://koto.studio/work";
const AGENCY: &str = "koto.studio";

pub struct KotoSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: &'static str,
        client: reqwest::Client,
    },
}

impl KotoSource {
    /// Parse a captured copy of the work page. Used by tests; no
    /// network access.
    pub fn from_fixture(html: &str) -> Self {
        Self {
            mode: Mode::Fixture(html.to_string()),
        }
    }

    pub fn from_url(url: &'static str) -> Self {
        Self {
            mode: Mode::Http {
                url,
                client: reqwest::Client::new(),
            },
        }
    }

    fn parse_work_page(html: &str) -> Result<Vec<Project>> {
        static CARD: OnceCell<Selector> = OnceCell::new();
        static TITLE: OnceCell<Selector> = OnceCell::new();
        let card = CARD.get_or_init(|| Selector::parse("a.work-row-thumb.tile").unwrap());
        let title = TITLE.get_or_init(|| Selector::parse("h2").unwrap());

        let base = Url::parse(WORK_URL).context("koto base url")?;
        let doc = Html::parse_document(html);

        let mut out = Vec::new();
        for el in doc.select(card) {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            if !is_followable(href) {
                continue;
            }
            let Ok(link) = base.join(href) else {
                continue;
            };

            let name = el
                .select(title)
                .next()
                .map(|h| normalize_title(&h.text().collect::<Vec<_>>().join(" ")))
                .unwrap_or_default();
            let video = el
                .value()
                .attr("data-work-page-thumbnail-video")
                .map(str::to_string);

            out.push(Project {
                title: name,
                url: link.to_string(),
                thumbnail: None,
                video,
                agency: AGENCY.to_string(),
                tags: Vec::new(),
                scraped_at: None,
            });
        }
        Ok(out)
    }
}

fn is_followable(href: &str) -> bool {
    let href = href.trim();
    !href.is_empty()
        && href != "#"
        && !href.starts_with("javascript:")
        && !href.starts_with("mailto:")
        && !href.starts_with("tel:")
}

#[async_trait]
impl ProjectSource for KotoSource {
    async fn fetch(&self) -> Result<Vec<Project>> {
        match &self.mode {
            Mode::Fixture(html) => Self::parse_work_page(html),
            Mode::Http { url, client } => {
                let body = client
                    .get(*url)
                    .send()
                    .await
                    .context("koto http get")?
                    .error_for_status()
                    .context("koto http status")?
                    .text()
                    .await
                    .context("koto http body")?;
                Self::parse_work_page(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "koto"
    }
}
