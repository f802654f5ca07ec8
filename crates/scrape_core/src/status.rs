use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Status codes that mark a response as a server-side failure.
pub const DEFAULT_ERROR_STATUS_CODES: [u16; 17] = [
    429, 499, 500, 502, 503, 504, 509, 520, 521, 522, 523, 524, 525, 526, 527, 530, 598,
];

/// HTTP status codes whose responses are never parsed as content.
///
/// A response with one of these codes yields the failure sentinels for that
/// attempt. Retrying is left to whoever schedules the next run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetryableStatusSet {
    codes: BTreeSet<u16>,
}

impl RetryableStatusSet {
    pub fn new(codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    pub fn contains(&self, status: u16) -> bool {
        self.codes.contains(&status)
    }
}

impl Default for RetryableStatusSet {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_STATUS_CODES)
    }
}

impl FromIterator<u16> for RetryableStatusSet {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_covers_cloudflare_range() {
        let set = RetryableStatusSet::default();
        for code in 520..=527 {
            assert!(set.contains(code), "{code} should be a failure status");
        }
        assert!(set.contains(429));
        assert!(set.contains(598));
        assert!(!set.contains(200));
        assert!(!set.contains(404));
        assert!(!set.contains(501));
        assert!(!set.contains(528));
    }

    #[test]
    fn custom_set_replaces_defaults() {
        let set: RetryableStatusSet = [404, 410].into_iter().collect();
        assert!(set.contains(404));
        assert!(!set.contains(503));
        assert_eq!(serde_json::to_string(&set).unwrap(), "[404,410]");
    }
}
