use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use scraper::Html;
use scrape_core::{FetchJob, FetchResult, RetryableStatusSet};

use crate::decode::decode_body;
use crate::extract::{BoilerplateExtractor, ExtractSettings, Extractor};
use crate::pool::map_ordered;
use crate::transport::{FetchSettings, ReqwestTransport, Transport};
use crate::{FailureKind, RawResponse, TlsVerification};

/// Bodies that serialize to one of these carry no document.
const NULL_EQUIVALENTS: &[&str] = &["None", "null"];

#[derive(Debug, Clone, Default)]
pub struct ScraperSettings {
    /// Log every fetch attempt at info level.
    pub verbose: bool,
    pub error_statuses: RetryableStatusSet,
}

/// Fetches one URL and turns the response into a [`FetchResult`].
///
/// Failure policy:
/// - a certificate validation error is retried once without validation;
/// - any other transport error, or a failing retry, yields
///   `(EMPTY_HTML, EMPTY_TEXT)`;
/// - a status in the configured [`RetryableStatusSet`] yields the same
///   sentinels whatever the body;
/// - a blank document yields `('', EMPTY_TEXT)`.
pub struct NewsScraper {
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn Extractor>,
    settings: ScraperSettings,
}

impl NewsScraper {
    pub fn new(
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn Extractor>,
        settings: ScraperSettings,
    ) -> Self {
        Self {
            transport,
            extractor,
            settings,
        }
    }

    /// Scraper over HTTP with the boilerplate extractor.
    pub fn with_reqwest(
        fetch: FetchSettings,
        extract: ExtractSettings,
        settings: ScraperSettings,
    ) -> Self {
        Self::new(
            Arc::new(ReqwestTransport::new(fetch)),
            Arc::new(BoilerplateExtractor::new(extract)),
            settings,
        )
    }

    /// Fetches a single job. Never fails; failures become sentinel results.
    pub async fn fetch_one(&self, job: &FetchJob) -> FetchResult {
        let Some(response) = self.download(&job.url).await else {
            return FetchResult::unavailable(job);
        };

        if self.settings.error_statuses.contains(response.status) {
            engine_warn!(
                "failed to fetch from url <{}>: server returned status {}",
                job.url,
                response.status
            );
            return FetchResult::unavailable(job);
        }

        let Some(markup) = canonical_markup(&response) else {
            engine_debug!("empty document from url <{}>", job.url);
            return FetchResult::empty_markup(job);
        };

        let text = self.extractor.extract(&markup);
        if text.is_none() {
            engine_debug!("no article body found at url <{}>", job.url);
        }
        FetchResult::fetched(job, markup, text)
    }

    async fn download(&self, url: &str) -> Option<RawResponse> {
        self.trace_attempt(url, TlsVerification::Enabled);
        match self.transport.get(url, TlsVerification::Enabled).await {
            Ok(response) => Some(response),
            Err(err) if err.kind == FailureKind::Certificate => {
                engine_warn!(
                    "certificate validation failed for url <{}>: {}; retrying without verification",
                    url,
                    err.message
                );
                self.trace_attempt(url, TlsVerification::Disabled);
                match self.transport.get(url, TlsVerification::Disabled).await {
                    Ok(response) => Some(response),
                    Err(err) => {
                        engine_warn!("failed to fetch from url <{}>: {}", url, err);
                        None
                    }
                }
            }
            Err(err) => {
                engine_warn!("failed to fetch from url <{}>: {}", url, err);
                None
            }
        }
    }

    fn trace_attempt(&self, url: &str, tls: TlsVerification) {
        if self.settings.verbose {
            match tls {
                TlsVerification::Enabled => engine_info!("try fetching from url <{}>", url),
                TlsVerification::Disabled => {
                    engine_info!("try fetching from url <{}> without certificate checks", url)
                }
            }
        }
    }
}

/// Fetches `jobs` with at most `worker_count` in flight; results come back in
/// submission order.
pub async fn fetch_batch(
    scraper: &Arc<NewsScraper>,
    jobs: Vec<FetchJob>,
    worker_count: usize,
) -> Vec<FetchResult> {
    let scraper = Arc::clone(scraper);
    let outcomes = map_ordered(jobs.clone(), worker_count, move |job| {
        let scraper = Arc::clone(&scraper);
        async move { scraper.fetch_one(&job).await }
    })
    .await;
    settle(&jobs, outcomes)
}

/// Replaces results of crashed fetch tasks with sentinels.
pub(crate) fn settle(
    jobs: &[FetchJob],
    outcomes: Vec<Result<FetchResult, tokio::task::JoinError>>,
) -> Vec<FetchResult> {
    jobs.iter()
        .zip(outcomes)
        .map(|(job, outcome)| match outcome {
            Ok(result) => result,
            Err(err) => {
                engine_error!("fetch task for url <{}> did not complete: {}", job.url, err);
                FetchResult::unavailable(job)
            }
        })
        .collect()
}

/// Decodes the body and re-serializes it as a full HTML document.
fn canonical_markup(response: &RawResponse) -> Option<String> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    let decoded = decode_body(&response.body, response.content_type.as_deref());
    if decoded.lossy {
        engine_debug!(
            "lossy {} decode for url <{}>",
            decoded.encoding_label,
            response.final_url
        );
    }
    let markup = Html::parse_document(&decoded.text).html();
    let trimmed = markup.trim();
    if trimmed.is_empty() || NULL_EQUIVALENTS.contains(&trimmed) {
        return None;
    }
    Some(markup)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &[u8]) -> RawResponse {
        RawResponse {
            status: 200,
            final_url: "https://example.com/".into(),
            content_type: Some("text/html; charset=utf-8".into()),
            body: body.to_vec(),
        }
    }

    #[test]
    fn blank_bodies_have_no_markup() {
        assert_eq!(canonical_markup(&response(b"")), None);
        assert_eq!(canonical_markup(&response(b" \n\t")), None);
    }

    #[test]
    fn null_like_body_is_kept_as_a_document() {
        let markup = canonical_markup(&response(b"None")).unwrap();
        assert!(markup.starts_with("<html>"));
        assert!(markup.contains("<body>None</body>"));
    }

    #[test]
    fn fragments_are_wrapped_into_a_document() {
        let markup = canonical_markup(&response(b"<p>Hello</p>")).unwrap();
        assert!(markup.starts_with("<html>"));
        assert!(markup.contains("<body><p>Hello</p></body>"));
    }
}
