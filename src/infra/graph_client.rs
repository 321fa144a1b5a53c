use async_trait::async_trait;
use reqwest::StatusCode;
use std::future::Future;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::app::ports::ApprovalSourcePort;
use crate::constants::ODATA_NEXT_LINK;
use crate::error::{PipelineError, Result};
use crate::observability::metrics;
use crate::types::RawApprovalItem;

/// Items and continuation link of one Graph collection page
pub fn parse_page(page: &Value) -> (Vec<RawApprovalItem>, Option<String>) {
    let items = page
        .get("value")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let next = page
        .get(ODATA_NEXT_LINK)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    (items, next)
}

/// Follow `@odata.nextLink` from `first_url`, collecting items in page order.
///
/// The first failing page aborts the whole fetch.
pub async fn fetch_all_pages<F, Fut>(first_url: &str, mut get_page: F) -> Result<Vec<RawApprovalItem>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let mut items = Vec::new();
    let mut next = Some(first_url.to_string());

    while let Some(url) = next {
        let page = get_page(url).await?;
        let (page_items, next_link) = parse_page(&page);
        debug!("Fetched page with {} items", page_items.len());
        metrics::fetch::page_fetched(page_items.len());
        items.extend(page_items);
        next = next_link;
    }

    Ok(items)
}

/// Reads approval items from Microsoft Graph with a caller-supplied token
pub struct GraphApprovalSource {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl GraphApprovalSource {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(PipelineError::Config("access token is required".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            url: url.into(),
            token,
        })
    }

    async fn get_page(&self, url: String) -> Result<Value> {
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("ConsistencyLevel", "eventual")
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let message = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json::<Value>().await?)
    }
}

#[async_trait]
impl ApprovalSourcePort for GraphApprovalSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_approvals(&self) -> Result<Vec<RawApprovalItem>> {
        let items = fetch_all_pages(&self.url, |url| self.get_page(url)).await?;
        info!("Found {} approvals", items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn stub_pages() -> HashMap<String, Value> {
        HashMap::from([
            (
                "https://graph.example/items".to_string(),
                json!({
                    "value": [{"id": "1"}, {"id": "2"}],
                    "@odata.nextLink": "https://graph.example/items?skip=2"
                }),
            ),
            (
                "https://graph.example/items?skip=2".to_string(),
                json!({ "value": [{"id": "3"}] }),
            ),
        ])
    }

    #[tokio::test]
    async fn follows_next_link_across_pages() {
        let pages = stub_pages();
        let requested = Mutex::new(Vec::new());

        let items = fetch_all_pages("https://graph.example/items", |url| {
            requested.lock().unwrap().push(url.clone());
            let page = pages.get(&url).cloned();
            async move {
                page.ok_or(PipelineError::Api {
                    status: 404,
                    message: url,
                })
            }
        })
        .await
        .unwrap();

        let ids: Vec<&str> = items.iter().filter_map(|i| i["id"].as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(
            *requested.lock().unwrap(),
            vec![
                "https://graph.example/items".to_string(),
                "https://graph.example/items?skip=2".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn failing_page_aborts_fetch() {
        let pages = stub_pages();

        let result = fetch_all_pages("https://graph.example/items", |url| {
            let page = if url.ends_with("skip=2") {
                Err(PipelineError::Api {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                })
            } else {
                Ok(pages[&url].clone())
            };
            async move { page }
        })
        .await;

        assert!(matches!(result, Err(PipelineError::Api { status: 503, .. })));
    }

    #[test]
    fn page_with_next_link() {
        let page = json!({
            "value": [{"id": "1"}, {"id": "2"}],
            "@odata.nextLink": "https://graph.example/next?skip=2"
        });
        let (items, next) = parse_page(&page);

        assert_eq!(items.len(), 2);
        assert_eq!(next.as_deref(), Some("https://graph.example/next?skip=2"));
    }

    #[test]
    fn last_page_has_no_link() {
        let (items, next) = parse_page(&json!({ "value": [] }));
        assert!(items.is_empty());
        assert!(next.is_none());

        let (items, _) = parse_page(&json!({}));
        assert!(items.is_empty());
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(matches!(
            GraphApprovalSource::new("https://graph.example", "  "),
            Err(PipelineError::Config(_))
        ));
    }
}
