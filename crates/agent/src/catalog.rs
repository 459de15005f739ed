use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use kopi_core::config::CatalogConfig;

/// CSS class carrying product titles on the shop's collection page.
pub const PRODUCT_TITLE_CLASS: &str = "product-card__title";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog fetch failed: {0}")]
    Fetch(String),
}

/// Supplies the ordered product-name documents the index is built from.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn product_names(&self) -> Result<Vec<String>, CatalogError>;
}

/// Fetches the shop collection page over HTTP with a fixed small number of
/// attempts and extracts product-card titles in document order.
pub struct HttpProductSource {
    client: reqwest::Client,
    url: String,
    attempts: u32,
}

impl HttpProductSource {
    pub fn new(url: impl Into<String>, attempts: u32, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder().timeout(timeout).build().unwrap_or_default(),
            url: url.into(),
            attempts: attempts.max(1),
        }
    }

    pub fn from_config(config: &CatalogConfig, source_url: &str) -> Self {
        Self::new(
            source_url,
            config.fetch_attempts,
            Duration::from_secs(config.fetch_timeout_secs),
        )
    }

    async fn fetch_page(&self) -> Result<String, CatalogError> {
        let mut last_error = String::new();

        for attempt in 0..self.attempts {
            match self.client.get(&self.url).send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .text()
                        .await
                        .map_err(|error| CatalogError::Fetch(error.to_string()));
                }
                Ok(response) => {
                    last_error = format!("status {}", response.status());
                }
                Err(error) => {
                    last_error = error.to_string();
                }
            }

            if attempt + 1 < self.attempts {
                warn!(
                    event_name = "catalog.fetch.retry",
                    attempt = attempt + 1,
                    error = %last_error,
                    "retrying catalog page fetch"
                );
                tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt + 1))).await;
            }
        }

        Err(CatalogError::Fetch(last_error))
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn product_names(&self) -> Result<Vec<String>, CatalogError> {
        let page = self.fetch_page().await?;
        let titles = extract_titles(&page, PRODUCT_TITLE_CLASS);
        if titles.is_empty() {
            warn!(
                event_name = "catalog.fetch.empty",
                url = %self.url,
                "catalog page contained no product titles"
            );
        }
        Ok(titles)
    }
}

/// Pull the text content of every element tagged with `class_name`, in
/// document order. The markup is the shop's fixed product-card layout, so a
/// class-anchored scan is all the parsing this needs.
pub fn extract_titles(html: &str, class_name: &str) -> Vec<String> {
    let mut titles = Vec::new();
    let mut cursor = 0;

    while let Some(found) = html[cursor..].find(class_name) {
        let after_class = cursor + found + class_name.len();
        let Some(tag_end) = html[after_class..].find('>') else {
            break;
        };
        let text_start = after_class + tag_end + 1;
        let Some(text_end) = html[text_start..].find('<') else {
            break;
        };

        let raw = html[text_start..text_start + text_end].trim();
        let title = decode_entities(raw);
        if !title.is_empty() {
            titles.push(title);
        }
        cursor = text_start + text_end;
    }

    titles
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

#[cfg(test)]
mod tests {
    use super::{extract_titles, PRODUCT_TITLE_CLASS};

    const PAGE: &str = r#"
        <div class="product-card">
          <span class="product-card__title">Frozee Cold Cup 650ml</span>
          <span class="product-card__price">RM 55</span>
        </div>
        <div class="product-card">
          <span class="product-card__title">
            All-Day Tumbler &amp; Sleeve
          </span>
        </div>
        <div class="product-card">
          <span class="product-card__title"></span>
        </div>
    "#;

    #[test]
    fn titles_are_extracted_in_document_order() {
        let titles = extract_titles(PAGE, PRODUCT_TITLE_CLASS);
        assert_eq!(
            titles,
            vec!["Frozee Cold Cup 650ml".to_string(), "All-Day Tumbler & Sleeve".to_string()]
        );
    }

    #[test]
    fn empty_elements_are_skipped() {
        let titles = extract_titles(PAGE, PRODUCT_TITLE_CLASS);
        assert_eq!(titles.len(), 2);
    }

    #[test]
    fn page_without_the_class_yields_nothing() {
        assert!(extract_titles("<html><body>nothing</body></html>", PRODUCT_TITLE_CLASS)
            .is_empty());
    }
}
