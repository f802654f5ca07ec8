use std::ops::Range;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::{ArticleText, FetchJob, FetchResult, Markup};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PartitionError {
    #[error("shard count must be at least 1")]
    ZeroShards,
}

/// A contiguous slice of the job list, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    pub number: usize,
    pub jobs: Vec<FetchJob>,
}

impl Shard {
    pub fn file_name(&self) -> String {
        shard_file_name(self.number)
    }
}

pub fn shard_file_name(number: usize) -> String {
    format!("batch{number}.json")
}

/// Splits `len` items into `shard_count` contiguous ranges whose sizes differ
/// by at most one; the leading shards take the remainder.
pub fn shard_ranges(len: usize, shard_count: usize) -> Result<Vec<Range<usize>>, PartitionError> {
    if shard_count == 0 {
        return Err(PartitionError::ZeroShards);
    }
    let base = len / shard_count;
    let extra = len % shard_count;

    let mut ranges = Vec::with_capacity(shard_count);
    let mut start = 0;
    for index in 0..shard_count {
        let size = base + usize::from(index < extra);
        ranges.push(start..start + size);
        start += size;
    }
    Ok(ranges)
}

/// Partitions jobs into shards, preserving their order.
pub fn partition(jobs: Vec<FetchJob>, shard_count: usize) -> Result<Vec<Shard>, PartitionError> {
    let ranges = shard_ranges(jobs.len(), shard_count)?;
    let mut remaining = jobs.into_iter();
    Ok(ranges
        .into_iter()
        .enumerate()
        .map(|(index, range)| Shard {
            number: index + 1,
            jobs: remaining.by_ref().take(range.len()).collect(),
        })
        .collect())
}

/// The persisted form of one shard: an object keyed by job id, in shard
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardDocument {
    pub batch: usize,
    pub results: Vec<FetchResult>,
}

impl ShardDocument {
    pub fn new(batch: usize, results: Vec<FetchResult>) -> Self {
        Self { batch, results }
    }
}

#[derive(Serialize)]
struct ShardRecord<'a> {
    batch: usize,
    serial: usize,
    url: &'a str,
    entities: Vec<String>,
    persons: &'a [String],
    organizations: &'a [String],
    text: &'a ArticleText,
    html: &'a Markup,
}

impl Serialize for ShardDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for (serial, result) in self.results.iter().enumerate() {
            let record = ShardRecord {
                batch: self.batch,
                serial,
                url: result.url(),
                entities: result.entities(),
                persons: result.persons(),
                organizations: result.organizations(),
                text: result.text(),
                html: result.markup(),
            };
            map.serialize_entry(result.id(), &record)?;
        }
        map.end()
    }
}
