use std::io;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{Error, Result};

/// One tracked unit of project work from the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkItem {
    pub id: Option<String>,
    pub title: String,
    pub assignee: Option<String>,
    pub story_points: Option<f64>,
    pub activated: Option<NaiveDateTime>,
    pub closed: Option<NaiveDateTime>,
    pub iteration: Option<String>,
}

/// A parsed export. `raw_count` is the row count before any scope filtering
/// is applied; it survives into the metrics block.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub items: Vec<WorkItem>,
    pub raw_count: usize,
    pub has_iteration_column: bool,
}

impl Dataset {
    /// Load a dataset from a CSV file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Load a dataset from any CSV source.
    ///
    /// Column discovery is case-insensitive substring matching over the
    /// header row, because source systems disagree on exact column names
    /// ("Assigned To" vs "Assignee", "Iteration Path" vs "Sprint"). A schema
    /// without a title or activation column is fatal; every other column
    /// degrades to absent values.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = ColumnMap::discover(&headers)?;
        log::debug!("column map: {columns:?}");

        let mut items = Vec::new();
        for record in rdr.records() {
            let record = record?;
            items.push(columns.parse_row(&record));
        }

        let raw_count = items.len();
        Ok(Dataset {
            items,
            raw_count,
            has_iteration_column: columns.iteration.is_some(),
        })
    }

    /// Distinct iteration labels present in the data, sorted. Used by the
    /// CLI to tell the user which sprints are reviewable.
    pub fn sprint_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .items
            .iter()
            .filter_map(|item| item.iteration.clone())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }
}

/// Resolved header indices for the fields we understand.
#[derive(Debug)]
struct ColumnMap {
    id: Option<usize>,
    title: usize,
    assignee: Option<usize>,
    story_points: Option<usize>,
    activated: usize,
    closed: Option<usize>,
    iteration: Option<usize>,
}

impl ColumnMap {
    fn discover(headers: &csv::StringRecord) -> Result<Self> {
        let lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        let find = |patterns: &[&str]| -> Option<usize> {
            patterns
                .iter()
                .find_map(|p| lower.iter().position(|h| h.contains(p)))
        };

        let title = find(&["title"]).ok_or_else(|| {
            Error::MalformedInput(format!("no title column found in header: {lower:?}"))
        })?;
        let activated = find(&["activated date", "activated"]).ok_or_else(|| {
            Error::MalformedInput(format!(
                "no activation timestamp column found in header: {lower:?}"
            ))
        })?;

        Ok(ColumnMap {
            id: find(&["work item id", "id"]),
            title,
            assignee: find(&["assigned to", "assignee"]),
            story_points: find(&["story points", "effort"]),
            activated,
            closed: find(&["closed date", "closed"]),
            iteration: find(&["iteration path", "sprint"]),
        })
    }

    fn parse_row(&self, record: &csv::StringRecord) -> WorkItem {
        let cell = |idx: Option<usize>| -> Option<&str> {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        WorkItem {
            id: cell(self.id).map(str::to_string),
            title: cell(Some(self.title)).unwrap_or_default().to_string(),
            assignee: cell(self.assignee).map(str::to_string),
            story_points: cell(self.story_points).and_then(parse_points),
            activated: cell(Some(self.activated)).and_then(parse_timestamp),
            closed: cell(self.closed).and_then(parse_timestamp),
            iteration: cell(self.iteration).map(str::to_string),
        }
    }
}

/// Parse a story-point cell. Unparseable values are treated as absent.
fn parse_points(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Parse a timestamp cell against the formats Azure DevOps and similar
/// trackers actually export. Unparseable values are treated as absent.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %H:%M",
    ];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
ID,Title,Assigned To,Story Points,Activated Date,Closed Date,Iteration Path
101,Login page,Alice,3,2025-03-01,2025-03-04,Project\\Sprint 3
102,Search API,Bob,5,2025-03-02,2025-03-08,Project\\Sprint 3
103,Bugfix,Alice,,2025-03-03,,Project\\Sprint 4
";

    #[test]
    fn test_load_basic() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.raw_count, 3);
        assert!(ds.has_iteration_column);

        let first = &ds.items[0];
        assert_eq!(first.id.as_deref(), Some("101"));
        assert_eq!(first.title, "Login page");
        assert_eq!(first.assignee.as_deref(), Some("Alice"));
        assert_eq!(first.story_points, Some(3.0));
        assert!(first.activated.is_some());
        assert!(first.closed.is_some());
        assert_eq!(first.iteration.as_deref(), Some("Project\\Sprint 3"));

        // Missing points and closed date degrade to None
        let third = &ds.items[2];
        assert_eq!(third.story_points, None);
        assert_eq!(third.closed, None);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let ds = Dataset::from_path(file.path()).unwrap();
        assert_eq!(ds.raw_count, 3);
    }

    #[test]
    fn test_column_discovery_is_case_insensitive_substring() {
        let csv = "work item id,TITLE,assignee,Effort,Activated,Closed,Sprint\n\
                   7,Task,Carol,8,2025-01-01,2025-01-03,S1\n";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        let item = &ds.items[0];
        assert_eq!(item.id.as_deref(), Some("7"));
        assert_eq!(item.assignee.as_deref(), Some("Carol"));
        assert_eq!(item.story_points, Some(8.0));
        assert_eq!(item.iteration.as_deref(), Some("S1"));
        assert!(item.closed.is_some());
    }

    #[test]
    fn test_missing_activated_column_is_fatal() {
        let csv = "ID,Title,Story Points\n1,Task,3\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_missing_title_column_is_fatal() {
        let csv = "ID,Activated Date\n1,2025-01-01\n";
        assert!(matches!(
            Dataset::from_reader(csv.as_bytes()),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_optional_columns_absent() {
        let csv = "Title,Activated Date\nOnly task,2025-01-01\n";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert!(!ds.has_iteration_column);
        let item = &ds.items[0];
        assert_eq!(item.assignee, None);
        assert_eq!(item.story_points, None);
        assert_eq!(item.closed, None);
    }

    #[test]
    fn test_unparseable_timestamp_degrades_to_none() {
        let csv = "Title,Activated Date,Closed Date\nTask,not-a-date,also bad\n";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.items[0].activated, None);
        assert_eq!(ds.items[0].closed, None);
    }

    #[test]
    fn test_timestamp_formats() {
        for s in [
            "2025-03-01",
            "2025-03-01 14:30:00",
            "2025-03-01T14:30:00",
            "2025-03-01T14:30:00Z",
            "3/1/2025",
            "3/1/2025 02:30:00 PM",
            "3/1/2025 14:30",
        ] {
            assert!(parse_timestamp(s).is_some(), "failed to parse: {s}");
        }
        assert!(parse_timestamp("Sprint 3").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_sprint_labels_sorted_unique() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            ds.sprint_labels(),
            vec!["Project\\Sprint 3".to_string(), "Project\\Sprint 4".to_string()]
        );
    }

    #[test]
    fn test_nonnumeric_points_degrade() {
        let csv = "Title,Activated Date,Story Points\nTask,2025-01-01,high\n";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.items[0].story_points, None);
    }
}
