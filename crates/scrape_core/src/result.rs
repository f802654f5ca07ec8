use serde::{Serialize, Serializer};

use crate::{FetchJob, JobId};

/// Written in place of markup when nothing could be fetched.
pub const EMPTY_HTML: &str = "[EMPTY_HTML]";
/// Written in place of text when nothing could be fetched or parsed.
pub const EMPTY_TEXT: &str = "[EMPTY_TEXT]";
/// Produced by the normalizer when cleaning removed every character.
pub const NULL_TEXT: &str = "[NULL]";

/// Canonical markup of a fetched page, or the fetch-failure sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    /// Re-serialized document. May be empty when the body was blank.
    Document(String),
    Unavailable,
}

impl Markup {
    pub fn as_str(&self) -> &str {
        match self {
            Markup::Document(html) => html,
            Markup::Unavailable => EMPTY_HTML,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Markup::Unavailable)
    }
}

impl Serialize for Markup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Article text of a page.
///
/// `NotFound` (extraction ran and found no article body) is serialized as
/// `null`, while `Unavailable` (nothing to extract from) is the sentinel
/// string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleText {
    Extracted(String),
    NotFound,
    Unavailable,
}

impl ArticleText {
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            ArticleText::Extracted(text) => Some(text),
            ArticleText::NotFound => None,
            ArticleText::Unavailable => Some(EMPTY_TEXT),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ArticleText::Unavailable)
    }
}

impl From<Option<String>> for ArticleText {
    fn from(text: Option<String>) -> Self {
        text.map_or(ArticleText::NotFound, ArticleText::Extracted)
    }
}

impl Serialize for ArticleText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_deref() {
            Some(text) => serializer.serialize_str(text),
            None => serializer.serialize_none(),
        }
    }
}

/// Outcome of fetching one job.
///
/// Only the constructors below build a result, so unavailable markup always
/// comes with unavailable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    id: JobId,
    url: String,
    persons: Vec<String>,
    organizations: Vec<String>,
    markup: Markup,
    text: ArticleText,
}

impl FetchResult {
    /// Nothing was fetched: `(EMPTY_HTML, EMPTY_TEXT)`.
    pub fn unavailable(job: &FetchJob) -> Self {
        Self::build(job, Markup::Unavailable, ArticleText::Unavailable)
    }

    /// A response arrived but its markup was empty: `('', EMPTY_TEXT)`.
    pub fn empty_markup(job: &FetchJob) -> Self {
        Self::build(job, Markup::Document(String::new()), ArticleText::Unavailable)
    }

    /// Markup and the extractor's verdict on it.
    pub fn fetched(job: &FetchJob, markup: String, text: Option<String>) -> Self {
        Self::build(job, Markup::Document(markup), ArticleText::from(text))
    }

    fn build(job: &FetchJob, markup: Markup, text: ArticleText) -> Self {
        Self {
            id: job.id.clone(),
            url: job.url.clone(),
            persons: job.persons.clone(),
            organizations: job.organizations.clone(),
            markup,
            text,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn persons(&self) -> &[String] {
        &self.persons
    }

    pub fn organizations(&self) -> &[String] {
        &self.organizations
    }

    pub fn entities(&self) -> Vec<String> {
        self.persons
            .iter()
            .chain(self.organizations.iter())
            .cloned()
            .collect()
    }

    pub fn markup(&self) -> &Markup {
        &self.markup
    }

    pub fn text(&self) -> &ArticleText {
        &self.text
    }

    pub fn is_unavailable(&self) -> bool {
        self.markup.is_unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> FetchJob {
        FetchJob::new("7", "https://example.com/a").with_persons(vec!["jane doe".into()])
    }

    #[test]
    fn unavailable_result_uses_both_sentinels() {
        let result = FetchResult::unavailable(&job());
        assert!(result.is_unavailable());
        assert_eq!(result.markup().as_str(), EMPTY_HTML);
        assert_eq!(result.text().as_deref(), Some(EMPTY_TEXT));
        assert_eq!(result.persons().to_vec(), vec!["jane doe".to_string()]);
    }

    #[test]
    fn empty_markup_is_present_but_blank() {
        let result = FetchResult::empty_markup(&job());
        assert!(!result.is_unavailable());
        assert_eq!(result.markup().as_str(), "");
        assert!(result.text().is_unavailable());
    }

    #[test]
    fn text_serializes_null_distinct_from_sentinel() {
        let not_found = serde_json::to_string(&ArticleText::NotFound).unwrap();
        let unavailable = serde_json::to_string(&ArticleText::Unavailable).unwrap();
        let extracted = serde_json::to_string(&ArticleText::Extracted(String::new())).unwrap();
        assert_eq!(not_found, "null");
        assert_eq!(unavailable, "\"[EMPTY_TEXT]\"");
        assert_eq!(extracted, "\"\"");
    }
}
