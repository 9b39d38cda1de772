//! ERDDAP tabledap client.
//!
//! Responses are requested as `.csv`: the first row holds column names,
//! the second their units, data follows. Missing values come back as `NaN`
//! or empty fields.

use crate::errors::{AppError, AppResult};
use crate::models::deployment::DeploymentName;
use crate::models::segment::Segment;
use crate::source::SegmentSource;
use crate::utils::time::parse_erddap_time;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use std::time::Duration;

/// Parsed tabledap CSV response.
#[derive(Debug, Default)]
pub struct ErddapTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ErddapTable {
    pub fn parse(body: &str) -> AppResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(body.as_bytes());

        let columns = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let mut records = reader.records();
        // units row
        records.next().transpose()?;

        let mut rows = Vec::new();
        for record in records {
            rows.push(record?.iter().map(|v| v.trim().to_string()).collect());
        }

        Ok(Self { columns, rows })
    }

    pub fn column(&self, name: &str) -> AppResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AppError::MalformedSegment(format!("missing column '{name}'")))
    }

    /// Non-missing values of one column.
    pub fn values<'a>(&'a self, name: &str) -> AppResult<impl Iterator<Item = &'a str> + use<'a>> {
        let idx = self.column(name)?;
        Ok(self
            .rows
            .iter()
            .filter_map(move |r| r.get(idx))
            .map(String::as_str)
            .filter(|v| !is_missing(v)))
    }

    fn numbers<'a>(&'a self, name: &str) -> AppResult<impl Iterator<Item = f64> + use<'a>> {
        Ok(self
            .values(name)?
            .filter_map(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite()))
    }
}

fn is_missing(v: &str) -> bool {
    v.is_empty() || v.eq_ignore_ascii_case("nan")
}

/// Build a segment from its raw `time,depth,sci_water_temp` rows.
pub fn segment_from_table(source_id: &str, table: &ErddapTable) -> AppResult<Segment> {
    let times = table
        .values("time")?
        .map(parse_erddap_time)
        .collect::<AppResult<Vec<_>>>()?;

    let (Some(start), Some(end)) = (times.iter().min(), times.iter().max()) else {
        return Err(AppError::MalformedSegment(format!("{source_id}: no time values")));
    };

    let depth_samples = table.numbers("depth")?.filter(|v| *v != 0.0).count() as u64;
    let temp_samples = table.numbers("sci_water_temp")?.filter(|v| *v != 0.0).count() as u64;
    let max_depth = table.numbers("depth")?.reduce(f64::max);

    Ok(Segment::new(source_id, *start, *end, depth_samples, temp_samples)?.with_max_depth(max_depth))
}

/// Number of profile times inside the segment's span (inclusive).
pub fn count_profiles(segment: &Segment, profile_times: &[DateTime<Utc>]) -> u32 {
    profile_times
        .iter()
        .filter(|t| **t >= segment.start && **t <= segment.end)
        .count() as u32
}

/// Attach profile counts to every segment. When the profile times could not
/// be fetched the counts stay unset, which keeps the sci check from firing.
pub fn apply_profile_counts(
    segments: Vec<Segment>,
    profile_times: AppResult<Vec<DateTime<Utc>>>,
    profile_dataset: &str,
) -> Vec<Segment> {
    match profile_times {
        Ok(times) => segments
            .into_iter()
            .map(|s| {
                let n = count_profiles(&s, &times);
                s.with_profile_count(Some(n))
            })
            .collect(),
        Err(e) => {
            warn!("{profile_dataset}: profile times unavailable ({e}), sci check skipped");
            segments
        }
    }
}

pub struct ErddapClient {
    client: Client,
    base_url: String,
}

impl ErddapClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{base}/tabledap/{dataset}.csv?{variables}{constraints}`
    pub fn tabledap_url(&self, dataset: &str, variables: &[&str], constraints: &[(&str, &str)], distinct: bool) -> String {
        let mut url = format!("{}/tabledap/{}.csv?{}", self.base_url, dataset, variables.join(","));

        for (var, value) in constraints {
            let quoted = format!("\"{value}\"");
            url.push_str(&format!("&{}={}", var, urlencoding::encode(&quoted)));
        }

        if distinct {
            url.push_str("&distinct()");
        }

        url
    }

    fn fetch_table(&self, dataset: &str, url: &str) -> AppResult<ErddapTable> {
        debug!("GET {url}");

        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(AppError::Fetch {
                resource: dataset.to_string(),
                reason: format!("HTTP {}", response.status().as_u16()),
            });
        }

        ErddapTable::parse(&response.text()?)
    }

    pub fn source_files(&self, dataset: &str) -> AppResult<Vec<String>> {
        let url = self.tabledap_url(dataset, &["source_file"], &[], true);
        let table = self.fetch_table(dataset, &url)?;
        Ok(table.values("source_file")?.map(str::to_string).collect())
    }

    pub fn segment(&self, dataset: &str, source_file: &str) -> AppResult<Segment> {
        let url = self.tabledap_url(
            dataset,
            &["time", "depth", "sci_water_temp"],
            &[("source_file", source_file)],
            false,
        );
        let table = self.fetch_table(dataset, &url)?;
        segment_from_table(source_file, &table)
    }

    pub fn profile_times(&self, dataset: &str) -> AppResult<Vec<DateTime<Utc>>> {
        let url = self.tabledap_url(dataset, &["profile_time"], &[], true);
        let table = self.fetch_table(dataset, &url)?;
        table.values("profile_time")?.map(parse_erddap_time).collect()
    }
}

impl SegmentSource for ErddapClient {
    fn segments(&self, deployment: &DeploymentName, with_profiles: bool) -> AppResult<Vec<Segment>> {
        let dataset = deployment.raw_trajectory_dataset();
        let files = self.source_files(&dataset)?;
        info!("{}: {} segments listed", dataset, files.len());

        let mut segments = files
            .iter()
            .map(|f| self.segment(&dataset, f))
            .collect::<AppResult<Vec<_>>>()?;

        if with_profiles {
            let profile_dataset = deployment.profile_dataset();
            let times = self.profile_times(&profile_dataset);
            segments = apply_profile_counts(segments, times, &profile_dataset);
        }

        Ok(segments)
    }
}
