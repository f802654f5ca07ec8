use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use scrape_core::{validate_jobs, FetchJob};

/// Reads the job list. `.jsonl` files hold one job per line; anything else
/// must be a JSON array.
pub fn load_jobs(path: &Path) -> Result<Vec<FetchJob>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read job list {}", path.display()))?;

    let jobs = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl")) {
        parse_lines(&text)
    } else {
        serde_json::from_str(&text).map_err(anyhow::Error::from)
    }
    .with_context(|| format!("failed to parse job list {}", path.display()))?;

    validate_jobs(&jobs).with_context(|| format!("invalid job list {}", path.display()))?;
    Ok(jobs)
}

fn parse_lines(text: &str) -> Result<Vec<FetchJob>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}", index + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn json_array_is_loaded_in_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jobs.json");
        fs::write(
            &path,
            r#"[{"id": 1, "url": "https://valid.example/article", "persons": ["ann"]},
                {"id": 2, "url": "https://down.example/"}]"#,
        )
        .unwrap();

        let jobs = load_jobs(&path).unwrap();
        assert_eq!(
            jobs,
            vec![
                FetchJob::new("1", "https://valid.example/article")
                    .with_persons(vec!["ann".into()]),
                FetchJob::new("2", "https://down.example/"),
            ]
        );
    }

    #[test]
    fn json_lines_skip_blank_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jobs.jsonl");
        fs::write(
            &path,
            "{\"id\": \"a\", \"url\": \"https://a.example\"}\n\n{\"id\": \"b\", \"url\": \"https://b.example\"}\n",
        )
        .unwrap();

        let ids: Vec<String> = load_jobs(&path).unwrap().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn bad_line_is_reported_with_its_number() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jobs.jsonl");
        fs::write(&path, "{\"id\": \"a\", \"url\": \"u\"}\n{oops}\n").unwrap();

        let err = load_jobs(&path).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jobs.json");
        fs::write(&path, r#"[{"id": 1, "url": "a"}, {"id": "1", "url": "b"}]"#).unwrap();

        let err = load_jobs(&path).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate job id"));
    }
}
