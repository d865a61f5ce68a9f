//! Pentagram portfolio extractor.
//!
//! Scrapes the arts & culture index at
//! <https://www.pentagram.com/arts-culture>. Cards are `div.project-card`
//! with the title in an `h2`, the project link on the first anchor,
//! an optional `img`/`video` thumbnail, and discipline tags.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use scraper::{Html, Selector};
use url::Url;

use crate::scrape::normalize_title;
use crate::scrape::types::{Project, ProjectSource};

pub const ARTS_CULTURE_URL: &str = "https://www.pentagram.com/arts-culture";
const AGENCY: &str = "pentagram.com";

pub struct PentagramSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: &'static str,
        client: reqwest::Client,
    },
}

impl PentagramSource {
    /// Parse a captured copy of the index page. Used by tests; no
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

    fn parse_index_page(html: &str) -> Result<Vec<Project>> {
        static CARD: OnceCell<Selector> = OnceCell::new();
        static TITLE: OnceCell<Selector> = OnceCell::new();
        static LINK: OnceCell<Selector> = OnceCell::new();
        static IMG: OnceCell<Selector> = OnceCell::new();
        static VIDEO: OnceCell<Selector> = OnceCell::new();
        static TAG: OnceCell<Selector> = OnceCell::new();
        let card = CARD.get_or_init(|| Selector::parse("div.project-card").unwrap());
        let title = TITLE.get_or_init(|| Selector::parse("h2").unwrap());
        let link = LINK.get_or_init(|| Selector::parse("a[href]").unwrap());
        let img = IMG.get_or_init(|| Selector::parse("img[src]").unwrap());
        let video = VIDEO.get_or_init(|| Selector::parse("video[src]").unwrap());
        let tag = TAG.get_or_init(|| Selector::parse(".disciplines a").unwrap());

        let base = Url::parse(ARTS_CULTURE_URL).context("pentagram base url")?;
        let doc = Html::parse_document(html);

        let mut out = Vec::new();
        for el in doc.select(card) {
            let Some(href) = el.select(link).next().and_then(|a| a.value().attr("href"))
            else {
                continue;
            };
            let Ok(project_url) = base.join(href) else {
                continue;
            };

            let name = el
                .select(title)
                .next()
                .map(|h| normalize_title(&h.text().collect::<Vec<_>>().join(" ")))
                .unwrap_or_default();
            let thumbnail = el
                .select(img)
                .next()
                .and_then(|i| i.value().attr("src"))
                .and_then(|src| base.join(src).ok())
                .map(|u| u.to_string());
            let media = el
                .select(video)
                .next()
                .and_then(|v| v.value().attr("src"))
                .and_then(|src| base.join(src).ok())
                .map(|u| u.to_string());
            let tags = el
                .select(tag)
                .map(|t| normalize_title(&t.text().collect::<Vec<_>>().join(" ")))
                .filter(|t| !t.is_empty())
                .collect();

            out.push(Project {
                title: name,
                url: project_url.to_string(),
                thumbnail,
                video: media,
                agency: AGENCY.to_string(),
                tags,
                scraped_at: None,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl ProjectSource for PentagramSource {
    async fn fetch(&self) -> Result<Vec<Project>> {
        match &self.mode {
            Mode::Fixture(html) => Self::parse_index_page(html),
            Mode::Http { url, client } => {
                let body = client
                    .get(*url)
                    .send()
                    .await
                    .context("pentagram http get")?
                    .error_for_status()
                    .context("pentagram http status")?
                    .text()
                    .await
                    .context("pentagram http body")?;
                Self::parse_index_page(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "pentagram"
    }
}
