use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Metadata lifted from a listing page. Fields are `None` when unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
}

/// Page metadata fetcher. Best-effort: failures yield an empty preview.
#[async_trait::async_trait]
pub trait Scraper: Send + Sync {
    async fn preview(&self, url: &str) -> Preview;
}

/// Largest page body that will be parsed.
const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

struct Patterns {
    meta: Regex,
    key: Regex,
    content: Regex,
    title: Regex,
    price: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    meta: Regex::new(r"(?is)<meta\b[^>]*>").unwrap(),
    key: Regex::new(r#"(?is)\b(?:property|name|itemprop)\s*=\s*["']([^"']+)["']"#).unwrap(),
    content: Regex::new(r#"(?is)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap(),
    title: Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap(),
    price: Regex::new(r"\$\s?(\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?").unwrap(),
});

fn unescape(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn clean(s: &str) -> Option<String> {
    let s = unescape(s.split_whitespace().collect::<Vec<_>>().join(" ").as_str());
    Some(s).filter(|s| !s.is_empty())
}

fn money(s: &str) -> Option<f64> {
    s.trim()
        .trim_start_matches('$')
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.)
}

/// Extract title, description, image, and price from raw HTML.
pub fn parse(url: &str, html: &str) -> Preview {
    let ref p = *PATTERNS;
    let metas = p
        .meta
        .find_iter(html)
        .filter_map(|tag| {
            let tag = tag.as_str();
            let key = p.key.captures(tag)?.get(1)?.as_str().to_ascii_lowercase();
            let caps = p.content.captures(tag)?;
            let value = caps.get(1).or_else(|| caps.get(2))?.as_str().to_string();
            Some((key, value))
        })
        .collect::<Vec<(String, String)>>();
    let meta = |keys: &[&str]| {
        keys.iter().find_map(|k| {
            metas
                .iter()
                .find(|(key, _)| key == k)
                .and_then(|(_, v)| clean(v))
        })
    };
    let title = meta(&["og:title", "twitter:title"]).or_else(|| {
        p.title
            .captures(html)
            .and_then(|c| c.get(1))
            .and_then(|m| clean(m.as_str()))
    });
    let description = meta(&["og:description", "description", "twitter:description"]);
    let image = meta(&["og:image", "og:image:url", "twitter:image"]);
    let price = meta(&["og:price:amount", "product:price:amount", "price"])
        .and_then(|s| money(&s))
        .or_else(|| {
            [title.as_deref(), description.as_deref()]
                .into_iter()
                .flatten()
                .find_map(|text| p.price.captures(text))
                .and_then(|c| c.get(1))
                .and_then(|m| money(m.as_str()))
        });
    Preview {
        url: url.to_string(),
        title,
        description,
        image,
        price,
    }
}

/// Fetches pages over HTTP and parses their metadata.
pub struct HttpScraper {
    http: reqwest::Client,
}

impl HttpScraper {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent(concat!("househunt/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Body up to `MAX_PAGE_BYTES`; the rest of the page is never read.
    async fn fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        let mut response = self.http.get(url).send().await?.error_for_status()?;
        let mut page = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = MAX_PAGE_BYTES - page.len();
            page.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if page.len() == MAX_PAGE_BYTES {
                break;
            }
        }
        Ok(String::from_utf8_lossy(&page).into_owned())
    }
}

#[async_trait::async_trait]
impl Scraper for HttpScraper {
    async fn preview(&self, url: &str) -> Preview {
        match self.fetch(url).await {
            Ok(ref html) => parse(url, html),
            Err(e) => {
                log::warn!("scraping {} failed: {}", url, e);
                Preview {
                    url: url.to_string(),
                    ..Preview::default()
                }
            }
        }
    }
}
