//! File-backed object store client.
//!
//! Every resource gets its own ACL document, so replacing one resource never
//! rewrites another:
//!
//! ```text
//! <data_dir>/<service_id>/<STORE>/<volume>/volume.acl.json
//! <data_dir>/<service_id>/<STORE>/<volume>/<bucket>.bucket.acl.json
//! ```
//!
//! Path components are percent-encoded and never start with `.`, so no
//! service id or resource name can address a file outside its own directory.
//!
//! A replace holds an exclusive advisory lock on the document's `.lock`
//! sibling from the read until the new document has been renamed into
//! place. Concurrent replaces of the same resource, from this or another
//! process, are serialized and each sees the state the previous one left.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acl::{AclEntry, AclSpec};
use crate::client::{Endpoint, ObjectStoreClient, StoreConnection};
use crate::descriptor::ResourceDescriptor;
use crate::error::ClientError;

/// File name of a volume's ACL document.
const VOLUME_FILE: &str = "volume.acl.json";

/// Suffix of a bucket's ACL document.
const BUCKET_SUFFIX: &str = ".bucket.acl.json";

/// Suffix of the lock file next to each document.
const LOCK_SUFFIX: &str = ".lock";

/// Current on-disk format version.
const STATE_VERSION: u32 = 1;

/// Bytes kept verbatim in a path component. Everything else, `%` included,
/// is percent-encoded.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.');

/// On-disk ACL document of one resource.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AclDocument {
    version: u32,
    /// `"<store kind>:<path>"` of the resource, for humans reading the file.
    resource: String,
    /// Stored entries in canonical order.
    entries: Vec<AclEntry>,
}

/// Store client persisting ACL sets below a data directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a client rooted at `root`. Directories are created on demand.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the state of `endpoint`. Always a direct child of
    /// the data root.
    #[must_use]
    pub fn service_dir(&self, endpoint: &Endpoint) -> PathBuf {
        self.root.join(encode_component(&endpoint.service_id))
    }

    /// The ACL document of `descriptor` on `endpoint`.
    #[must_use]
    pub fn resource_file(&self, endpoint: &Endpoint, descriptor: &ResourceDescriptor) -> PathBuf {
        resource_file(&self.service_dir(endpoint), descriptor)
    }
}

#[async_trait]
impl ObjectStoreClient for LocalObjectStore {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn StoreConnection>, ClientError> {
        if endpoint.service_id.is_empty() {
            return Err(ClientError::Connect {
                service_id: String::new(),
                message: "service id is empty".to_owned(),
            });
        }
        let dir = self.service_dir(endpoint);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ClientError::Connect {
                service_id: endpoint.service_id.clone(),
                message: format!("cannot open {}: {e}", dir.display()),
            })?;
        debug!(service_id = %endpoint, dir = %dir.display(), "opened local connection");
        Ok(Box::new(LocalConnection {
            endpoint: endpoint.clone(),
            dir,
        }))
    }
}

/// A connection to one service directory.
#[derive(Debug)]
struct LocalConnection {
    endpoint: Endpoint,
    dir: PathBuf,
}

#[async_trait]
impl StoreConnection for LocalConnection {
    async fn replace_acl(
        &mut self,
        descriptor: &ResourceDescriptor,
        entries: &AclSpec,
    ) -> Result<bool, ClientError> {
        let path = resource_file(&self.dir, descriptor);
        let resource = format!("{}:{}", descriptor.store_kind(), descriptor.path());
        let submitted = entries.to_set();

        let changed =
            tokio::task::spawn_blocking(move || replace_locked(&path, resource, submitted))
                .await
                .map_err(|e| ClientError::Internal(anyhow::Error::new(e)))??;

        debug!(
            service_id = %self.endpoint,
            resource = %descriptor,
            changed,
            "replaced local ACL document"
        );
        Ok(changed)
    }
}

impl Drop for LocalConnection {
    fn drop(&mut self) {
        debug!(service_id = %self.endpoint, "closed local connection");
    }
}

/// Compare and replace one document while holding its lock.
///
/// A missing document is an empty set, so submitting no entries for an
/// unknown resource is unchanged and writes nothing.
fn replace_locked(
    path: &Path,
    resource: String,
    submitted: BTreeSet<AclEntry>,
) -> Result<bool, ClientError> {
    let dir = path.parent().ok_or_else(|| {
        ClientError::Internal(anyhow::anyhow!("{} has no parent", path.display()))
    })?;
    fs::create_dir_all(dir)?;

    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(path))?;
    lock.lock_exclusive()?;

    let stored: BTreeSet<AclEntry> = read_document(path)?
        .map(|doc| doc.entries.into_iter().collect())
        .unwrap_or_default();
    if stored == submitted {
        return Ok(false);
    }

    let doc = AclDocument {
        version: STATE_VERSION,
        resource,
        entries: submitted.into_iter().collect(),
    };
    write_document(dir, path, &doc)?;
    drop(lock);
    Ok(true)
}

fn read_document(path: &Path) -> Result<Option<AclDocument>, ClientError> {
    match File::open(path) {
        Ok(file) => Ok(Some(serde_json::from_reader(io::BufReader::new(file))?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write through a temp file in `dir` renamed over `path`.
fn write_document(dir: &Path, path: &Path, doc: &AclDocument) -> Result<(), ClientError> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, doc)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn resource_file(service_dir: &Path, descriptor: &ResourceDescriptor) -> PathBuf {
    let volume_dir = service_dir
        .join(descriptor.store_kind().as_str())
        .join(encode_component(descriptor.volume_name()));
    match descriptor.bucket_name() {
        Some(bucket) => volume_dir.join(format!("{}{BUCKET_SUFFIX}", encode_component(bucket))),
        None => volume_dir.join(VOLUME_FILE),
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
}

/// Map a name onto a single path component, injectively.
///
/// A leading `.` is encoded too, so the result is never `.`, `..` or a
/// hidden file.
fn encode_component(name: &str) -> String {
    let encoded = utf8_percent_encode(name, COMPONENT_ENCODE_SET).to_string();
    match encoded.strip_prefix('.') {
        Some(rest) => format!("%2E{rest}"),
        None => encoded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl_spec::parse;
    use crate::types::StoreKind;

    fn bucket() -> ResourceDescriptor {
        ResourceDescriptor::new(StoreKind::Native, "vol1", Some("b1".to_owned()))
            .expect("test descriptor")
    }

    fn volume(name: &str) -> ResourceDescriptor {
        ResourceDescriptor::new(StoreKind::Native, name, None).expect("test descriptor")
    }

    fn stored(path: &Path) -> Vec<String> {
        read_document(path)
            .expect("test read")
            .map(|doc| doc.entries.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_should_persist_across_connections() {
        let dir = tempfile::tempdir().expect("test tempdir");
        let store = LocalObjectStore::new(dir.path());
        let endpoint = Endpoint::new("om1:9862");
        let spec = parse("user:bob:rw,world::r").expect("test parse");

        {
            let mut conn = store.connect(&endpoint).await.expect("test connect");
            assert!(conn.replace_acl(&bucket(), &spec).await.expect("test replace"));
        }

        let mut conn = store.connect(&endpoint).await.expect("test connect");
        assert!(!conn.replace_acl(&bucket(), &spec).await.expect("test replace"));

        let file = store.resource_file(&endpoint, &bucket());
        assert!(file.ends_with("om1%3A9862/OZONE/vol1/b1.bucket.acl.json"));
        let text = std::fs::read_to_string(file).expect("test read");
        assert!(text.contains("\"OZONE:/vol1/b1\""));
        assert!(text.contains("\"READ\""));
    }

    #[tokio::test]
    async fn test_should_overwrite_previous_set() {
        let dir = tempfile::tempdir().expect("test tempdir");
        let store = LocalObjectStore::new(dir.path());
        let endpoint = Endpoint::new("local");
        let mut conn = store.connect(&endpoint).await.expect("test connect");

        conn.replace_acl(&bucket(), &parse("user:a:r").expect("test parse"))
            .await
            .expect("test replace");
        assert!(
            conn.replace_acl(&bucket(), &parse("user:b:w").expect("test parse"))
                .await
                .expect("test replace")
        );

        assert_eq!(stored(&store.resource_file(&endpoint, &bucket())), ["user:b:w"]);
    }

    #[tokio::test]
    async fn test_should_keep_volume_and_bucket_documents_apart() {
        let dir = tempfile::tempdir().expect("test tempdir");
        let store = LocalObjectStore::new(dir.path());
        let endpoint = Endpoint::new("local");
        let mut conn = store.connect(&endpoint).await.expect("test connect");

        conn.replace_acl(&volume("vol1"), &parse("user:a:r").expect("test parse"))
            .await
            .expect("test replace");
        conn.replace_acl(&bucket(), &parse("user:b:w").expect("test parse"))
            .await
            .expect("test replace");

        assert_eq!(stored(&store.resource_file(&endpoint, &volume("vol1"))), ["user:a:r"]);
        assert_eq!(stored(&store.resource_file(&endpoint, &bucket())), ["user:b:w"]);
    }

    #[tokio::test]
    async fn test_should_treat_empty_set_on_unknown_resource_as_unchanged() {
        let dir = tempfile::tempdir().expect("test tempdir");
        let store = LocalObjectStore::new(dir.path());
        let endpoint = Endpoint::new("local");
        let mut conn = store.connect(&endpoint).await.expect("test connect");

        let changed = conn
            .replace_acl(&volume("vol1"), &AclSpec::new(Vec::new()))
            .await
            .expect("test replace");
        assert!(!changed);
        assert!(!store.resource_file(&endpoint, &volume("vol1")).exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_keep_every_concurrent_replace_on_independent_resources() {
        let dir = tempfile::tempdir().expect("test tempdir");
        let store = LocalObjectStore::new(dir.path());
        let endpoint = Endpoint::new("om1");
        let spec = parse("user:bob:rw").expect("test parse");

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                let endpoint = endpoint.clone();
                let spec = spec.clone();
                tokio::spawn(async move {
                    let mut conn = store.connect(&endpoint).await?;
                    conn.replace_acl(&volume(&format!("vol{i}")), &spec).await
                })
            })
            .collect();
        for task in tasks {
            assert!(task.await.expect("test join").expect("test replace"));
        }

        for i in 0..32 {
            let file = store.resource_file(&endpoint, &volume(&format!("vol{i}")));
            assert_eq!(stored(&file), ["user:bob:rw"], "vol{i}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_report_one_change_for_concurrent_identical_replaces() {
        let dir = tempfile::tempdir().expect("test tempdir");
        let store = LocalObjectStore::new(dir.path());
        let endpoint = Endpoint::new("om1");
        let spec = parse("user:bob:rw,group:hadoop:a").expect("test parse");

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let endpoint = endpoint.clone();
                let spec = spec.clone();
                tokio::spawn(async move {
                    let mut conn = store.connect(&endpoint).await?;
                    conn.replace_acl(&bucket(), &spec).await
                })
            })
            .collect();
        let mut changes = 0;
        for task in tasks {
            if task.await.expect("test join").expect("test replace") {
                changes += 1;
            }
        }
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_should_report_corrupt_state() {
        let dir = tempfile::tempdir().expect("test tempdir");
        let store = LocalObjectStore::new(dir.path());
        let endpoint = Endpoint::new("local");
        let file = store.resource_file(&endpoint, &bucket());
        std::fs::create_dir_all(file.parent().expect("test parent")).expect("test mkdir");
        std::fs::write(&file, b"{not json").expect("test write");

        let result = tokio_test::block_on(async {
            let mut conn = store.connect(&endpoint).await?;
            conn.replace_acl(&bucket(), &parse("user:a:r").expect("test parse"))
                .await
        });
        assert!(matches!(result, Err(ClientError::Codec(_))));
    }

    #[test]
    fn test_should_encode_path_components() {
        assert_eq!(encode_component("om-1.example:9862"), "om-1.example%3A9862");
        assert_eq!(encode_component("../etc"), "%2E.%2Fetc");
        assert_eq!(encode_component(".."), "%2E.");
        assert_eq!(encode_component("."), "%2E");
        assert_eq!(encode_component("a%2Eb"), "a%252Eb");
        assert_eq!(encode_component("a_b"), "a_b");
        assert_ne!(encode_component("a:b"), encode_component("a_b"));
    }

    #[tokio::test]
    async fn test_should_keep_dot_service_ids_inside_data_root() {
        let tmp = tempfile::tempdir().expect("test tempdir");
        let root = tmp.path().join("data");
        let store = LocalObjectStore::new(&root);
        let spec = parse("user:a:r").expect("test parse");

        for service_id in ["..", ".", "../.."] {
            let endpoint = Endpoint::new(service_id);
            assert_eq!(store.service_dir(&endpoint).parent(), Some(root.as_path()));

            let mut conn = store.connect(&endpoint).await.expect("test connect");
            conn.replace_acl(&volume("vol1"), &spec).await.expect("test replace");
            assert!(store.resource_file(&endpoint, &volume("vol1")).starts_with(&root));
        }
        assert!(!tmp.path().join("OZONE").exists());
        assert!(!root.join("OZONE").exists());
    }

    #[tokio::test]
    async fn test_should_reject_empty_service_id() {
        let dir = tempfile::tempdir().expect("test tempdir");
        let store = LocalObjectStore::new(dir.path());
        assert!(matches!(
            store.connect(&Endpoint::new("")).await,
            Err(ClientError::Connect { .. })
        ));
    }
}
