//! Versioned artifact store.
//!
//! Every project directory doubles as a store: artifacts live as plain
//! files at the top level, and each overwrite first snapshots the previous
//! content under `.history/<artifact>/<revision>`. History is append-only
//! and never pruned; the live file stays a normal file so the generated
//! application remains directly servable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

const HISTORY_DIR: &str = ".history";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub revision: u64,
    pub data: Vec<u8>,
}

impl Snapshot {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(ArtifactStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Artifact names are bare file names; anything that could escape the
    /// project directory is rejected.
    pub fn path_of(&self, name: &str) -> io::Result<PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid artifact name `{name}`"),
            ));
        }
        Ok(self.root.join(name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn read(&self, name: &str) -> io::Result<Option<String>> {
        Ok(self
            .read_bytes(name)?
            .map(|data| String::from_utf8_lossy(&data).into_owned()))
    }

    pub fn read_bytes(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.path_of(name)?;
        if !path.is_file() {
            return Ok(None);
        }
        fs::read(path).map(Some)
    }

    /// Resolve a possibly-misspelled artifact name to a stored one. Exact
    /// names win; otherwise the best fuzzy candidate above a fixed bar.
    pub fn resolve(&self, name: &str) -> io::Result<Option<String>> {
        if self.exists(name) {
            return Ok(Some(name.to_string()));
        }

        let matcher = SkimMatcherV2::default();
        let mut best: Option<(i64, String)> = None;
        for candidate in self.list()? {
            if let Some(score) = matcher.fuzzy_match(&candidate, name) {
                let beats = match &best {
                    Some((top, _)) => score > *top,
                    None => true,
                };
                if beats {
                    best = Some((score, candidate));
                }
            }
        }

        Ok(best.and_then(|(score, candidate)| ((score as f64 / 100.0) > 0.8).then_some(candidate)))
    }

    /// Overwrite an artifact, snapshotting the previous content first.
    /// Returns the total number of history entries after the write.
    pub fn write(&self, name: &str, content: &str) -> io::Result<u64> {
        self.write_bytes(name, content.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, data: &[u8]) -> io::Result<u64> {
        let path = self.path_of(name)?;
        let mut revisions = self.revision_count(name)?;

        if path.is_file() {
            let previous = fs::read(&path)?;
            let dir = self.root.join(HISTORY_DIR).join(name);
            fs::create_dir_all(&dir)?;
            revisions += 1;
            fs::write(dir.join(format!("{revisions:06}")), previous)?;
        }

        fs::write(path, data)?;
        Ok(revisions)
    }

    /// All snapshots of an artifact, oldest first. Empty for artifacts that
    /// were written at most once.
    pub fn history(&self, name: &str) -> io::Result<Vec<Snapshot>> {
        self.path_of(name)?;
        let dir = self.root.join(HISTORY_DIR).join(name);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let Some(revision) = entry
                .file_name()
                .to_str()
                .and_then(|s| s.parse::<u64>().ok())
            else {
                continue;
            };
            snapshots.push(Snapshot {
                revision,
                data: fs::read(entry.path())?,
            });
        }
        snapshots.sort_by_key(|s| s.revision);
        Ok(snapshots)
    }

    /// Live artifact names, hidden bookkeeping excluded.
    pub fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn revision_count(&self, name: &str) -> io::Result<u64> {
        let dir = self.root.join(HISTORY_DIR).join(name);
        if !dir.is_dir() {
            return Ok(0);
        }
        let mut count = 0;
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                count += 1;
            }
        }
        Ok(count)
    }
}
