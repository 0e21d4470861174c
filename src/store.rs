//! Snapshot history: saved forms and their generated documents.
//!
//! [`History`] keeps a local store and optionally mirrors it to a remote
//! collection. The remote side is best effort: when it fails the local
//! result is still returned, together with a [`Notice`] for the user.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

#[cfg(feature = "remote")]
use url::Url;

use crate::config::Config;
use crate::error::StoreError;
use crate::form::FormState;
use crate::types::Shape;

/// A saved form together with the document built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    pub shape: Shape,
    pub form: FormState,
    pub document: Value,
    pub created_at: DateTime<Utc>,
    /// Whether the remote collection has a copy.
    #[serde(default)]
    pub synced: bool,
}

impl Snapshot {
    pub fn new(name: impl Into<String>, shape: Shape, form: FormState, document: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            shape,
            form,
            document,
            created_at: Utc::now(),
            synced: false,
        }
    }
}

/// Persistence for snapshots. Listings are newest first.
pub trait SnapshotStore {
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<Snapshot>, StoreError>;
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Snapshots kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Snapshot>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, snapshots: &[Snapshot]) -> Result<(), StoreError> {
        let write_error = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(write_error)?;
                parent
            }
            None => Path::new("."),
        };
        let content = serde_json::to_string_pretty(snapshots).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        // Readers see either the old or the new history, never a partial file.
        let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
        file.write_all(content.as_bytes()).map_err(write_error)?;
        file.persist(&self.path)
            .map(|_| ())
            .map_err(|e| write_error(e.error))
    }
}

impl SnapshotStore for FileStore {
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut snapshots = self.read()?;
        snapshots.retain(|s| s.id != snapshot.id);
        snapshots.push(snapshot.clone());
        newest_first(&mut snapshots);
        self.write(&snapshots)?;
        debug!(id = %snapshot.id, path = %self.path.display(), "saved snapshot");
        Ok(())
    }

    fn list(&self) -> Result<Vec<Snapshot>, StoreError> {
        let mut snapshots = self.read()?;
        newest_first(&mut snapshots);
        Ok(snapshots)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut snapshots = self.read()?;
        let before = snapshots.len();
        snapshots.retain(|s| s.id != id);
        if snapshots.len() == before {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        self.write(&snapshots)
    }
}

/// Snapshots kept in a REST collection.
///
/// `GET {base}` lists, `POST {base}` saves, `DELETE {base}/{id}` deletes.
/// The id is sent as a single percent-encoded path segment.
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct HttpStore {
    base_url: Url,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "remote")]
impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
        let raw = base_url.into();
        let invalid = |message: String| StoreError::Remote {
            url: raw.clone(),
            message,
        };

        let mut base_url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
        base_url
            .path_segments_mut()
            .map_err(|()| invalid("not a collection URL".to_string()))?
            .pop_if_empty();

        let client = reqwest::blocking::Client::builder()
            .timeout(crate::loader::HTTP_TIMEOUT)
            .build()
            .map_err(|e| invalid(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    fn item_url(&self, id: &str) -> Result<Url, StoreError> {
        if matches!(id, "" | "." | "..") {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::NotFound { id: id.to_string() })?
            .push(id);
        Ok(url)
    }

    fn remote_error(&self, url: &Url, err: reqwest::Error) -> StoreError {
        StoreError::Remote {
            url: url.to_string(),
            message: err.without_url().to_string(),
        }
    }
}

#[cfg(feature = "remote")]
impl SnapshotStore for HttpStore {
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.client
            .post(self.base_url.clone())
            .json(snapshot)
            .send()
            .and_then(|response| response.error_for_status())
            .map(|_| ())
            .map_err(|e| self.remote_error(&self.base_url, e))
    }

    fn list(&self) -> Result<Vec<Snapshot>, StoreError> {
        let mut snapshots: Vec<Snapshot> = self
            .client
            .get(self.base_url.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .map_err(|e| self.remote_error(&self.base_url, e))?;
        newest_first(&mut snapshots);
        Ok(snapshots)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let url = self.item_url(id)?;
        let response = self
            .client
            .delete(url.clone())
            .send()
            .map_err(|e| self.remote_error(&url, e))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        response
            .error_for_status()
            .map(|_| ())
            .map_err(|e| self.remote_error(&url, e))
    }
}

/// Message about a degraded collaborator, shown alongside a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A result plus an optional notice.
#[derive(Debug, Clone, PartialEq)]
pub struct WithNotice<T> {
    pub value: T,
    pub notice: Option<Notice>,
}

/// Local history with an optional remote mirror.
pub struct History {
    local: Box<dyn SnapshotStore>,
    remote: Option<Box<dyn SnapshotStore>>,
}

impl History {
    pub fn new(local: impl SnapshotStore + 'static) -> Self {
        Self {
            local: Box::new(local),
            remote: None,
        }
    }

    pub fn with_remote(mut self, remote: impl SnapshotStore + 'static) -> Self {
        self.remote = Some(Box::new(remote));
        self
    }

    /// History backed by the configured file and, if set, remote URL.
    pub fn from_config(config: &Config) -> Self {
        let history = History::new(FileStore::new(&config.history_path));
        match config.history_url.as_deref() {
            None => history,
            #[cfg(feature = "remote")]
            Some(url) => match HttpStore::new(url) {
                Ok(remote) => history.with_remote(remote),
                Err(e) => {
                    warn!(error = %e, "remote history disabled");
                    history
                }
            },
            #[cfg(not(feature = "remote"))]
            Some(url) => {
                warn!(url, "remote history needs the `remote` feature; using local only");
                history
            }
        }
    }

    /// Save locally, mirroring to the remote store when there is one.
    ///
    /// The returned snapshot has `synced` set if the remote accepted it.
    pub fn save(&self, mut snapshot: Snapshot) -> Result<WithNotice<Snapshot>, StoreError> {
        let mut notice = None;
        if let Some(remote) = &self.remote {
            snapshot.synced = true;
            if let Err(e) = remote.save(&snapshot) {
                snapshot.synced = false;
                notice = Some(degraded(&e));
            }
        }
        self.local.save(&snapshot)?;
        Ok(WithNotice {
            value: snapshot,
            notice,
        })
    }

    /// Local snapshots merged with the remote ones, newest first.
    pub fn list(&self) -> Result<WithNotice<Vec<Snapshot>>, StoreError> {
        let local = self.local.list()?;
        let Some(remote) = &self.remote else {
            return Ok(WithNotice {
                value: local,
                notice: None,
            });
        };

        match remote.list() {
            Ok(remote) => Ok(WithNotice {
                value: merge(local, remote),
                notice: None,
            }),
            Err(e) => Ok(WithNotice {
                value: local,
                notice: Some(degraded(&e)),
            }),
        }
    }

    /// Delete from both stores. Missing from one of them is not an error.
    pub fn delete(&self, id: &str) -> Result<WithNotice<()>, StoreError> {
        let local = self.local.delete(id);

        let mut remote_deleted = false;
        let mut notice = None;
        if let Some(remote) = &self.remote {
            match remote.delete(id) {
                Ok(()) => remote_deleted = true,
                Err(StoreError::NotFound { .. }) => {}
                Err(e) => notice = Some(degraded(&e)),
            }
        }

        match local {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) if remote_deleted => {}
            Err(e) => return Err(e),
        }
        Ok(WithNotice { value: (), notice })
    }
}

fn degraded(err: &StoreError) -> Notice {
    warn!(error = %err, "remote history unavailable");
    Notice {
        message: format!("{}; kept local copy only", err),
    }
}

/// Combine local and remote listings.
///
/// Entries sharing an id collapse to the remote copy, marked synced.
/// The result is newest first.
pub fn merge(local: Vec<Snapshot>, remote: Vec<Snapshot>) -> Vec<Snapshot> {
    let mut merged: Vec<Snapshot> = Vec::with_capacity(local.len() + remote.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    let remote = remote.into_iter().map(|mut s| {
        s.synced = true;
        s
    });
    for snapshot in local.into_iter().chain(remote) {
        match index.get(&snapshot.id) {
            Some(&i) => merged[i] = snapshot,
            None => {
                index.insert(snapshot.id.clone(), merged.len());
                merged.push(snapshot);
            }
        }
    }

    newest_first(&mut merged);
    merged
}

fn newest_first(snapshots: &mut [Snapshot]) {
    snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn snapshot(id: &str, minute: u32) -> Snapshot {
        Snapshot {
            id: id.to_string(),
            name: format!("snap {}", id),
            shape: Shape::Service,
            form: FormState::default(),
            document: json!({ "@type": "Service" }),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
            synced: false,
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        items: Rc<RefCell<Vec<Snapshot>>>,
    }

    impl SnapshotStore for MemoryStore {
        fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
            self.items.borrow_mut().push(snapshot.clone());
            Ok(())
        }

        fn list(&self) -> Result<Vec<Snapshot>, StoreError> {
            Ok(self.items.borrow().clone())
        }

        fn delete(&self, id: &str) -> Result<(), StoreError> {
            let mut items = self.items.borrow_mut();
            let before = items.len();
            items.retain(|s| s.id != id);
            if items.len() == before {
                return Err(StoreError::NotFound { id: id.to_string() });
            }
            Ok(())
        }
    }

    struct DownStore;

    impl SnapshotStore for DownStore {
        fn save(&self, _: &Snapshot) -> Result<(), StoreError> {
            Err(down())
        }

        fn list(&self) -> Result<Vec<Snapshot>, StoreError> {
            Err(down())
        }

        fn delete(&self, _: &str) -> Result<(), StoreError> {
            Err(down())
        }
    }

    fn down() -> StoreError {
        StoreError::Remote {
            url: "http://history.test".into(),
            message: "connection refused".into(),
        }
    }

    #[test]
    fn file_store_replaces_file_whole() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let store = FileStore::new(&path);

        store.save(&snapshot("a", 1)).unwrap();
        store.save(&snapshot("b", 2)).unwrap();
        store.delete("a").unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, [std::ffi::OsString::from("history.json")]);

        let on_disk: Vec<Snapshot> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk[0].id, "b");
    }

    #[test]
    fn file_store_lists_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested/history.json"));

        store.save(&snapshot("a", 1)).unwrap();
        store.save(&snapshot("b", 3)).unwrap();
        store.save(&snapshot("c", 2)).unwrap();

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("history.json"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn file_store_save_replaces_same_id() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("history.json"));

        store.save(&snapshot("a", 1)).unwrap();
        let mut renamed = snapshot("a", 1);
        renamed.name = "renamed".into();
        store.save(&renamed).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "renamed");
    }

    #[test]
    fn file_store_delete() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("history.json"));
        store.save(&snapshot("a", 1)).unwrap();

        store.delete("a").unwrap();
        assert!(store.list().unwrap().is_empty());
        assert!(matches!(
            store.delete("a"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn file_store_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ nope").unwrap();

        let result = FileStore::new(&path).list();
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn merge_dedups_and_sorts() {
        let local = vec![snapshot("a", 1), snapshot("b", 5)];
        let remote = vec![snapshot("b", 5), snapshot("c", 3)];

        let merged = merge(local, remote);
        let ids: Vec<&str> = merged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
        assert!(merged[0].synced);
        assert!(merged[1].synced);
        assert!(!merged[2].synced);
    }

    #[test]
    fn history_save_marks_synced() {
        let local = MemoryStore::default();
        let remote = MemoryStore::default();
        let history = History::new(local.clone()).with_remote(remote.clone());

        let saved = history.save(snapshot("a", 1)).unwrap();
        assert!(saved.value.synced);
        assert!(saved.notice.is_none());
        assert!(local.items.borrow()[0].synced);
        assert_eq!(remote.items.borrow().len(), 1);
    }

    #[test]
    fn history_save_survives_remote_failure() {
        let local = MemoryStore::default();
        let history = History::new(local.clone()).with_remote(DownStore);

        let saved = history.save(snapshot("a", 1)).unwrap();
        assert!(!saved.value.synced);
        let notice = saved.notice.unwrap();
        assert!(notice.message.contains("connection refused"));
        assert_eq!(local.items.borrow().len(), 1);
    }

    #[test]
    fn history_list_falls_back_to_local() {
        let local = MemoryStore::default();
        local.save(&snapshot("a", 1)).unwrap();
        let history = History::new(local).with_remote(DownStore);

        let listed = history.list().unwrap();
        assert_eq!(listed.value.len(), 1);
        assert!(listed.notice.is_some());
    }

    #[test]
    fn history_without_remote_has_no_notice() {
        let history = History::new(MemoryStore::default());
        let saved = history.save(snapshot("a", 1)).unwrap();
        assert!(!saved.value.synced);
        assert!(saved.notice.is_none());
    }

    #[test]
    fn history_delete_remote_only() {
        let remote = MemoryStore::default();
        remote.save(&snapshot("r", 1)).unwrap();
        let history = History::new(MemoryStore::default()).with_remote(remote.clone());

        history.delete("r").unwrap();
        assert!(remote.items.borrow().is_empty());
        assert!(matches!(
            history.delete("r"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let value = serde_json::to_value(snapshot("a", 1)).unwrap();
        assert_eq!(value["createdAt"], "2024-05-01T12:01:00Z");
        assert_eq!(value["shape"], json!({ "flavor": "service" }));
        assert_eq!(value["synced"], false);
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn http_store_round_trip() {
            let mut server = mockito::Server::new();
            let listing = serde_json::to_string(&vec![snapshot("x", 2), snapshot("y", 4)]).unwrap();
            let list_mock = server
                .mock("GET", "/history")
                .with_header("content-type", "application/json")
                .with_body(listing)
                .create();
            let save_mock = server
                .mock("POST", "/history")
                .match_body(mockito::Matcher::PartialJson(json!({ "id": "z" })))
                .with_status(201)
                .create();
            let delete_mock = server.mock("DELETE", "/history/x").with_status(204).create();

            let store = HttpStore::new(format!("{}/history/", server.url())).unwrap();
            let ids: Vec<String> = store.list().unwrap().into_iter().map(|s| s.id).collect();
            assert_eq!(ids, ["y", "x"]);
            store.save(&snapshot("z", 1)).unwrap();
            store.delete("x").unwrap();

            list_mock.assert();
            save_mock.assert();
            delete_mock.assert();
        }

        #[test]
        fn http_store_encodes_ids_as_one_segment() {
            let mut server = mockito::Server::new();
            let encoded = server
                .mock("DELETE", "/history/a%2Fb")
                .with_status(204)
                .create();
            let unencoded = mockito::Matcher::Regex("^/history(/a/b|/a|/)?$".into());
            let other = server.mock("DELETE", unencoded).expect(0).create();

            let store = HttpStore::new(format!("{}/history", server.url())).unwrap();
            store.delete("a/b").unwrap();
            for id in ["..", ".", ""] {
                assert!(matches!(store.delete(id), Err(StoreError::NotFound { .. })));
            }

            encoded.assert();
            other.assert();
        }

        #[test]
        fn http_store_errors() {
            let mut server = mockito::Server::new();
            let _list = server.mock("GET", "/history").with_status(500).create();
            let _delete = server.mock("DELETE", "/history/gone").with_status(404).create();

            let store = HttpStore::new(format!("{}/history", server.url())).unwrap();
            assert!(matches!(store.list(), Err(StoreError::Remote { .. })));
            assert!(matches!(
                store.delete("gone"),
                Err(StoreError::NotFound { .. })
            ));
        }
    }
}
