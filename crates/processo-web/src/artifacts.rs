use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Random bytes per artifact id; ids are their lowercase hex encoding.
pub const ID_BYTES: usize = 16;

/// Artifacts older than this are removed on the next insert.
pub const ARTIFACT_TTL: Duration = Duration::from_secs(30 * 60);

/// Most artifacts kept at once; the oldest go first.
pub const MAX_ARTIFACTS: usize = 256;

/// What an artifact holds. Each kind lives under its own extension, so an
/// image id never resolves to a JSON document and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    PageImage,
    CaseJson,
}

impl ArtifactKind {
    fn extension(self) -> &'static str {
        match self {
            ArtifactKind::PageImage => "jpg",
            ArtifactKind::CaseJson => "json",
        }
    }
}

pub fn new_id() -> String {
    (0..ID_BYTES)
        .map(|_| format!("{:02x}", fastrand::u8(..)))
        .collect()
}

pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_BYTES * 2 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Files produced for clients (page images, case JSON), addressed by opaque
/// random ids.
///
/// Every insert first evicts artifacts older than the TTL, then the oldest
/// ones beyond the entry cap. Everything left is removed when the store is
/// dropped.
pub struct ArtifactStore {
    dir: TempDir,
    ttl: Duration,
    max_entries: usize,
    /// Stored files, oldest first.
    entries: Mutex<VecDeque<(Instant, PathBuf)>>,
}

impl ArtifactStore {
    pub fn new() -> io::Result<Self> {
        Self::with_limits(ARTIFACT_TTL, MAX_ARTIFACTS)
    }

    pub fn with_limits(ttl: Duration, max_entries: usize) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("processo-artifacts-")
            .tempdir()?;
        tracing::debug!(dir = %dir.path().display(), ?ttl, max_entries, "artifact store created");
        Ok(Self {
            dir,
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(VecDeque::new()),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<(Instant, PathBuf)>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Evict expired entries and make room for one more.
    fn evict(&self, entries: &mut VecDeque<(Instant, PathBuf)>) {
        while let Some((created, path)) = entries.front() {
            let expired = created.elapsed() >= self.ttl;
            if !expired && entries.len() < self.max_entries {
                break;
            }
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove artifact");
                }
            }
            tracing::debug!(path = %path.display(), expired, "artifact evicted");
            entries.pop_front();
        }
    }

    fn path(&self, id: &str, kind: ArtifactKind) -> Option<PathBuf> {
        is_valid_id(id).then(|| self.dir.path().join(format!("{id}.{}", kind.extension())))
    }

    fn fresh_path(&self, kind: ArtifactKind) -> (String, PathBuf) {
        loop {
            let id = new_id();
            let path = self.dir.path().join(format!("{id}.{}", kind.extension()));
            if !path.exists() {
                return (id, path);
            }
        }
    }

    /// Copy `source` into the store.
    pub fn insert_file(&self, kind: ArtifactKind, source: &Path) -> io::Result<String> {
        let mut entries = self.lock();
        self.evict(&mut entries);
        let (id, path) = self.fresh_path(kind);
        std::fs::copy(source, &path)?;
        entries.push_back((Instant::now(), path));
        Ok(id)
    }

    pub fn insert_bytes(&self, kind: ArtifactKind, data: &[u8]) -> io::Result<String> {
        let mut entries = self.lock();
        self.evict(&mut entries);
        let (id, path) = self.fresh_path(kind);
        std::fs::write(&path, data)?;
        entries.push_back((Instant::now(), path));
        Ok(id)
    }

    /// Contents of an artifact; `None` for malformed or unknown ids.
    pub fn read(&self, id: &str, kind: ArtifactKind) -> Option<Vec<u8>> {
        let path = self.path(id, kind)?;
        std::fs::read(path).ok()
    }
}
