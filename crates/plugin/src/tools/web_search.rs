//! Web search: crawls result pages on the dedicated crawler pool.
//!
//! Takes no create-time configuration. Each URL in the input becomes one
//! fetch task on [`WEBSEARCH_CRAWLER_THREADPOOL`]; if the pool refuses a
//! task the run reports "temporarily unavailable" instead of failing.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};
use skillhost_capability::{
    Capability, CapabilityError, CapabilityKind, CapabilityOutput, CrawlerDeps, Params,
};
use skillhost_executor::ExecutorError;
use tracing::{debug, warn};

use crate::plugin::WEBSEARCH_CRAWLER_THREADPOOL;

const UNAVAILABLE: &str = "web search is temporarily unavailable, retry later";

pub struct WebSearchTool;

impl CapabilityKind for WebSearchTool {
    type Deps = CrawlerDeps;

    const NAME: &'static str = "WebSearchTool";
    const DESCRIPTION: &'static str = "Fetches web pages for a query and returns their content.";
    const POOL: Option<&'static str> = Some(WEBSEARCH_CRAWLER_THREADPOOL);

    fn build(deps: &CrawlerDeps, _params: Params) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(WebSearch { deps: deps.clone() }))
    }
}

struct WebSearch {
    deps: CrawlerDeps,
}

fn urls(input: &Value) -> Option<Vec<String>> {
    let list = input.get("urls")?.as_array()?;
    let urls: Vec<String> = list
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    (!urls.is_empty() && urls.len() == list.len()).then_some(urls)
}

#[async_trait]
impl Capability for WebSearch {
    fn name(&self) -> &str {
        WebSearchTool::NAME
    }

    fn validate(&self, input: &Value) -> bool {
        urls(input).is_some()
    }

    async fn run(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        let urls = urls(&input).ok_or_else(|| {
            CapabilityError::InvalidInput("'urls' must be a non-empty array of strings".into())
        })?;
        let pool = self.deps.executors.pool(WEBSEARCH_CRAWLER_THREADPOOL)?;

        let mut tasks = Vec::with_capacity(urls.len());
        for url in &urls {
            let fetcher = Arc::clone(&self.deps.fetcher);
            let target = url.clone();
            match pool.try_submit(async move { fetcher.fetch(&target).await }) {
                Ok(handle) => tasks.push(handle),
                Err(ExecutorError::PoolSaturated { name, capacity }) => {
                    warn!(pool = %name, capacity, "crawler pool saturated, abandoning search");
                    for task in &tasks {
                        task.abort();
                    }
                    return Ok(CapabilityOutput::unavailable(UNAVAILABLE));
                }
                Err(e) => return Err(e.into()),
            }
        }
        debug!(pages = tasks.len(), "crawl tasks submitted");

        let mut pages = Vec::with_capacity(urls.len());
        for (url, joined) in urls.iter().zip(join_all(tasks.into_iter().map(|t| t.join())).await) {
            let page = match joined? {
                Ok(content) => json!({ "url": url, "content": content }),
                Err(e) => json!({ "url": url, "error": e.to_string() }),
            };
            pages.push(page);
        }

        let mut content = json!({ "pages": pages });
        if let Some(query) = input.get("query") {
            content["query"] = query.clone();
        }
        Ok(CapabilityOutput::ok(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_must_be_non_empty_strings() {
        assert_eq!(
            urls(&json!({"urls": ["https://a", "https://b"]})),
            Some(vec!["https://a".to_string(), "https://b".to_string()])
        );
        assert_eq!(urls(&json!({"urls": []})), None);
        assert_eq!(urls(&json!({"urls": ["https://a", 3]})), None);
        assert_eq!(urls(&json!({"query": "rust"})), None);
    }
}
