use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque, stable identifier of a job. Numeric ids in the input are kept in
/// their decimal form.
pub type JobId = String;

/// One unit of fetch work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchJob {
    #[serde(deserialize_with = "id_from_text_or_number")]
    pub id: JobId,
    pub url: String,
    #[serde(default)]
    pub persons: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
}

impl FetchJob {
    pub fn new(id: impl Into<JobId>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            persons: Vec::new(),
            organizations: Vec::new(),
        }
    }

    pub fn with_persons(mut self, persons: Vec<String>) -> Self {
        self.persons = persons;
        self
    }

    pub fn with_organizations(mut self, organizations: Vec<String>) -> Self {
        self.organizations = organizations;
        self
    }

    /// All associated entities: persons first, then organizations.
    pub fn entities(&self) -> Vec<String> {
        self.persons
            .iter()
            .chain(self.organizations.iter())
            .cloned()
            .collect()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JobSetError {
    #[error("duplicate job id {0:?}")]
    DuplicateId(JobId),
}

/// Rejects job sets where an id appears twice; shard files are keyed by id.
pub fn validate_jobs(jobs: &[FetchJob]) -> Result<(), JobSetError> {
    let mut seen = HashSet::with_capacity(jobs.len());
    for job in jobs {
        if !seen.insert(job.id.as_str()) {
            return Err(JobSetError::DuplicateId(job.id.clone()));
        }
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

fn id_from_text_or_number<'de, D>(deserializer: D) -> Result<JobId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_concatenate_persons_then_organizations() {
        let job = FetchJob::new("a", "https://example.com")
            .with_persons(vec!["ada lovelace".into()])
            .with_organizations(vec!["royal society".into(), "nasa".into()]);
        assert_eq!(
            job.entities(),
            vec!["ada lovelace", "royal society", "nasa"]
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let jobs = vec![
            FetchJob::new("1", "https://a.example"),
            FetchJob::new("2", "https://b.example"),
            FetchJob::new("1", "https://c.example"),
        ];
        assert_eq!(
            validate_jobs(&jobs),
            Err(JobSetError::DuplicateId("1".into()))
        );
        assert_eq!(validate_jobs(&jobs[..2]), Ok(()));
    }
}
