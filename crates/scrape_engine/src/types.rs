use std::fmt;
use std::path::PathBuf;

use scrape_core::{ArticleText, FetchResult, JobId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVerification {
    Enabled,
    Disabled,
}

/// A transport-level response, before any status classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// The peer certificate could not be validated.
    Certificate,
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Certificate => write!(f, "certificate validation failed"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// How a job ended, as reported to progress sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Article,
    NoArticle,
    EmptyMarkup,
    Unavailable,
}

impl JobOutcome {
    pub fn of(result: &FetchResult) -> Self {
        if result.is_unavailable() {
            return JobOutcome::Unavailable;
        }
        match result.text() {
            ArticleText::Extracted(_) => JobOutcome::Article,
            ArticleText::NotFound => JobOutcome::NoArticle,
            ArticleText::Unavailable => JobOutcome::EmptyMarkup,
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobOutcome::Article => "article",
            JobOutcome::NoArticle => "no article",
            JobOutcome::EmptyMarkup => "empty markup",
            JobOutcome::Unavailable => "unavailable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ShardStarted {
        shard: usize,
        jobs: usize,
    },
    JobFinished {
        shard: usize,
        serial: usize,
        job_id: JobId,
        outcome: JobOutcome,
    },
    ShardWritten {
        shard: usize,
        path: PathBuf,
    },
    ShardSkipped {
        shard: usize,
        path: PathBuf,
    },
    ShardFailed {
        shard: usize,
        error: String,
    },
}
