//! Filesystem-backed persistence for captured exchanges
//!
//! One file per saved exchange under the configured log directory. Two
//! retention modes: latest-per-route overwrite (default) and immutable
//! append. Save and read failures are logged and swallowed so capture can
//! never break a request; only directory creation at startup is fatal.

use crate::capture::record::{timestamp_format, ExchangeRecord};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tracing::{error, warn};

/// On-disk serialization format for exchange files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Txt,
}

impl LogFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Txt => "txt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }
}

/// Replaces every character outside `[A-Za-z0-9.-]` with `_`.
///
/// Not injective: distinct endpoints can share a slug (`/a/b` and `/a_b`).
/// In latest-overwrite mode such endpoints alias to one file; the hazard is
/// accepted to keep the conventional file names.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Filesystem store for [`ExchangeRecord`]s.
pub struct ExchangeStore {
    directory: PathBuf,
    format: LogFormat,
    replace_latest: bool,
    // Serializes delete + write + rename so concurrent saves for the same
    // (method, slug) leave exactly one of the two inputs on disk.
    write_lock: Mutex<()>,
}

impl ExchangeStore {
    /// Opens the store, creating the log directory. Failure here is fatal.
    pub fn new(directory: impl Into<PathBuf>, format: LogFormat, replace_latest: bool) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)
            .with_context(|| format!("failed to create log directory {}", directory.display()))?;
        Ok(Self {
            directory,
            format,
            replace_latest,
            write_lock: Mutex::new(()),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File name of the latest sample for an endpoint, always in JSON form:
    /// `<METHOD>_<slug>_latest.json`.
    pub fn latest_json_file_name(method: &str, endpoint: &str) -> String {
        format!("{}_{}_latest.json", method, sanitize(endpoint))
    }

    fn latest_file_name(&self, record: &ExchangeRecord) -> String {
        format!(
            "{}_{}_latest.{}",
            record.method,
            sanitize(&record.endpoint),
            self.format.extension()
        )
    }

    fn unique_file_name(&self, record: &ExchangeRecord) -> String {
        let date = chrono::Local::now().format("%Y-%m-%d");
        let time = record.timestamp.format("%H%M%S-%3f");
        format!(
            "{}_{}_{}_{}.{}",
            date,
            record.method,
            sanitize(&record.endpoint),
            time,
            self.format.extension()
        )
    }

    /// Persists one record. Errors are logged and swallowed; a failed save
    /// never propagates into the request path.
    pub fn save(&self, record: &ExchangeRecord) {
        if let Err(e) = self.try_save(record) {
            error!(
                endpoint = %record.endpoint,
                method = %record.method,
                error = %e,
                "Failed to save exchange record"
            );
        }
    }

    fn try_save(&self, record: &ExchangeRecord) -> Result<PathBuf> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let file_name = if self.replace_latest {
            self.delete_stale_for_endpoint(record);
            self.latest_file_name(record)
        } else {
            self.unique_file_name(record)
        };

        let content = match self.format {
            LogFormat::Json => serde_json::to_string_pretty(record)?,
            LogFormat::Txt => render_text(record),
        };

        // Temp sibling + rename keeps a save atomic: readers see either the
        // previous file or the complete new one.
        let target = self.directory.join(&file_name);
        let tmp = self.directory.join(format!(".{}.tmp", file_name));
        fs::write(&tmp, content)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &target)
            .with_context(|| format!("failed to rename into {}", target.display()))?;

        Ok(target)
    }

    /// Removes every file whose name carries this record's method and slug,
    /// in the current format. Stale latest files from other slugged spellings
    /// of the same endpoint go with them.
    fn delete_stale_for_endpoint(&self, record: &ExchangeRecord) {
        let slug = sanitize(&record.endpoint);
        let suffix = format!(".{}", self.format.extension());

        for path in self.list_files() {
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };
            if name.contains(&record.method) && name.contains(&slug) && name.ends_with(&suffix) {
                if let Err(e) = fs::remove_file(&path) {
                    warn!(file = %path.display(), error = %e, "Failed to delete stale exchange file");
                }
            }
        }
    }

    /// All parseable records, newest first.
    pub fn get_all(&self) -> Vec<ExchangeRecord> {
        let suffix = format!(".{}", self.format.extension());
        let mut records: Vec<ExchangeRecord> = self
            .list_files()
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.ends_with(&suffix))
                    .unwrap_or(false)
            })
            .filter_map(|p| self.read_record(&p))
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    /// Records whose file name contains the sanitized endpoint.
    pub fn get_by_endpoint(&self, endpoint: &str) -> Vec<ExchangeRecord> {
        let slug = sanitize(endpoint);
        self.list_files()
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.contains(&slug))
                    .unwrap_or(false)
            })
            .filter_map(|p| self.read_record(&p))
            .collect()
    }

    /// Records captured on a given date (append mode prefixes file names with
    /// the ISO date).
    pub fn get_by_date(&self, date: NaiveDate) -> Vec<ExchangeRecord> {
        let prefix = date.format("%Y-%m-%d").to_string();
        self.list_files()
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(&prefix))
                    .unwrap_or(false)
            })
            .filter_map(|p| self.read_record(&p))
            .collect()
    }

    /// Deletes every file whose last-modified time is strictly before
    /// `now - days`. `days = 0` removes all.
    pub fn clean_older_than(&self, days: u64) {
        let cutoff = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);

        for path in self.list_files() {
            let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(t) => t,
                Err(_) => continue,
            };
            if modified < cutoff {
                if let Err(e) = fs::remove_file(&path) {
                    warn!(file = %path.display(), error = %e, "Failed to delete old exchange file");
                }
            }
        }
    }

    /// Latest JSON sample for `(method, endpoint)`, if one has been captured.
    /// A missing file is not an error.
    pub fn load_latest(&self, method: &str, endpoint: &str) -> Option<ExchangeRecord> {
        let path = self
            .directory
            .join(Self::latest_json_file_name(method, endpoint));
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Failed to read latest sample");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Failed to parse latest sample");
                None
            }
        }
    }

    fn list_files(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                error!(directory = %self.directory.display(), error = %e, "Failed to list log directory");
                return Vec::new();
            }
        };
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect()
    }

    fn read_record(&self, path: &Path) -> Option<ExchangeRecord> {
        // Text files have no machine-readable form
        if self.format != LogFormat::Json {
            return None;
        }
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Failed to read exchange file");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Failed to parse exchange file");
                None
            }
        }
    }
}

/// Human-readable fixed layout for the txt format.
fn render_text(record: &ExchangeRecord) -> String {
    let banner = "=".repeat(80);
    let mut out = String::new();

    out.push_str(&banner);
    out.push_str("\nAPI REQUEST/RESPONSE LOG\n");
    out.push_str(&banner);
    out.push_str("\n\n");

    out.push_str(&format!(
        "Timestamp: {}\n",
        record.timestamp.format(timestamp_format::FORMAT)
    ));
    out.push_str(&format!("Endpoint: {}\n", record.endpoint));
    out.push_str(&format!("Method: {}\n", record.method));
    out.push_str(&format!("Status Code: {}\n", record.status_code));
    out.push_str(&format!("Execution Time: {}ms\n", record.execution_time));
    out.push_str(&format!("Client IP: {}\n\n", record.client_ip));

    out.push_str("--- REQUEST HEADERS ---\n");
    for (k, v) in &record.request_headers {
        out.push_str(&format!("{}: {}\n", k, v));
    }

    out.push_str("\n--- QUERY PARAMETERS ---\n");
    for (k, v) in &record.query_params {
        out.push_str(&format!("{}={}\n", k, v));
    }

    out.push_str("\n--- PATH VARIABLES ---\n");
    for (k, v) in &record.path_variables {
        out.push_str(&format!("{}={}\n", k, v));
    }

    out.push_str("\n--- REQUEST BODY ---\n");
    out.push_str(&body_text(record.request_body.as_ref()));

    out.push_str("\n\n--- RESPONSE BODY ---\n");
    out.push_str(&body_text(record.response_body.as_ref()));

    out.push_str("\n\n");
    out.push_str(&banner);
    out.push('\n');
    out
}

fn body_text(body: Option<&serde_json::Value>) -> String {
    match body {
        None => "N/A".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn record(method: &str, endpoint: &str, status: u16) -> ExchangeRecord {
        ExchangeRecord {
            id: Uuid::new_v4(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            request_body: None,
            request_headers: BTreeMap::new(),
            query_params: BTreeMap::new(),
            path_variables: BTreeMap::new(),
            response_body: Some(serde_json::json!({"ok": true})),
            status_code: status,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_milli_opt(10, 0, 0, 100)
                .unwrap(),
            execution_time: 5,
            client_ip: "127.0.0.1".to_string(),
        }
    }

    #[test]
    fn test_sanitize_replaces_outside_charset() {
        assert_eq!(sanitize("/api/users/7"), "_api_users_7");
        assert_eq!(sanitize("v1.2-beta"), "v1.2-beta");
        assert_eq!(sanitize("a b?c=d"), "a_b_c_d");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize("/api/users/{id}");
        assert_eq!(sanitize(&once), once);
        assert!(once
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'));
    }

    #[test]
    fn test_latest_file_name() {
        assert_eq!(
            ExchangeStore::latest_json_file_name("GET", "/api/users/7"),
            "GET__api_users_7_latest.json"
        );
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExchangeStore::new(dir.path(), LogFormat::Json, true).unwrap();

        let r = record("GET", "/api/users/7", 200);
        store.save(&r);

        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, r.id);
        assert_eq!(all[0].status_code, 200);
        // the wire format carries second precision
        assert_eq!(all[0].timestamp, r.timestamp.with_nanosecond(0).unwrap());
    }

    #[test]
    fn test_replace_latest_keeps_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExchangeStore::new(dir.path(), LogFormat::Json, true).unwrap();

        store.save(&record("GET", "/api/users/7", 200));
        store.save(&record("GET", "/api/users/7", 404));

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(files, vec!["GET__api_users_7_latest.json".to_string()]);

        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status_code, 404);
    }

    #[test]
    fn test_append_mode_unique_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExchangeStore::new(dir.path(), LogFormat::Json, false).unwrap();

        let mut r1 = record("GET", "/api/users/7", 200);
        r1.timestamp = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_milli_opt(10, 0, 0, 100)
            .unwrap();
        let mut r2 = r1.clone();
        r2.id = Uuid::new_v4();
        r2.timestamp = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_milli_opt(10, 0, 0, 200)
            .unwrap();

        store.save(&r1);
        store.save(&r2);

        let mut files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        files.sort();
        assert_eq!(files.len(), 2);
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        assert_eq!(
            files[0],
            format!("{}_GET__api_users_7_100000-100.json", today)
        );
        assert_eq!(
            files[1],
            format!("{}_GET__api_users_7_100000-200.json", today)
        );
    }

    #[test]
    fn test_txt_format_writes_banner_but_reads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExchangeStore::new(dir.path(), LogFormat::Txt, true).unwrap();

        store.save(&record("GET", "/api/users/7", 200));

        let path = dir.path().join("GET__api_users_7_latest.txt");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&"=".repeat(80)));
        assert!(content.contains("API REQUEST/RESPONSE LOG"));
        assert!(content.contains("Method: GET"));
        assert!(content.contains("Status Code: 200"));
        assert!(content.contains("--- REQUEST BODY ---\nN/A"));

        assert!(store.get_all().is_empty());
    }

    #[test]
    fn test_get_all_sorted_descending() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExchangeStore::new(dir.path(), LogFormat::Json, false).unwrap();

        for (minute, path) in [(1, "/a"), (3, "/b"), (2, "/c")] {
            let mut r = record("GET", path, 200);
            r.timestamp = NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(10, minute, 0)
                .unwrap();
            store.save(&r);
        }

        let all = store.get_all();
        let endpoints: Vec<_> = all.iter().map(|r| r.endpoint.as_str()).collect();
        assert_eq!(endpoints, vec!["/b", "/c", "/a"]);
    }

    #[test]
    fn test_get_by_endpoint_filters() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExchangeStore::new(dir.path(), LogFormat::Json, true).unwrap();

        store.save(&record("GET", "/api/users/7", 200));
        store.save(&record("GET", "/api/orders/1", 200));

        let matched = store.get_by_endpoint("/api/users/7");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].endpoint, "/api/users/7");
    }

    #[test]
    fn test_clean_older_than_zero_removes_all() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExchangeStore::new(dir.path(), LogFormat::Json, true).unwrap();

        store.save(&record("GET", "/a", 200));
        store.save(&record("POST", "/b", 201));
        assert_eq!(store.get_all().len(), 2);

        store.clean_older_than(0);
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn test_clean_keeps_recent_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExchangeStore::new(dir.path(), LogFormat::Json, true).unwrap();

        store.save(&record("GET", "/fresh", 200));
        store.clean_older_than(30);
        assert_eq!(store.get_all().len(), 1);
    }

    fn backdate(path: &Path, days: u64) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60))
            .unwrap();
    }

    #[test]
    fn test_clean_removes_only_files_past_cutoff() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExchangeStore::new(dir.path(), LogFormat::Json, true).unwrap();

        store.save(&record("GET", "/old", 200));
        store.save(&record("GET", "/new", 200));
        backdate(&dir.path().join("GET__old_latest.json"), 40);
        backdate(&dir.path().join("GET__new_latest.json"), 5);

        store.clean_older_than(30);

        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].endpoint, "/new");
        assert!(!dir.path().join("GET__old_latest.json").exists());
    }

    #[test]
    fn test_load_latest_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExchangeStore::new(dir.path(), LogFormat::Json, true).unwrap();
        assert!(store.load_latest("POST", "/api/echo").is_none());
    }

    #[test]
    fn test_load_latest_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExchangeStore::new(dir.path(), LogFormat::Json, true).unwrap();

        store.save(&record("POST", "/api/echo", 200));
        let loaded = store.load_latest("POST", "/api/echo").unwrap();
        assert_eq!(loaded.endpoint, "/api/echo");
    }
}
