//! Git audit trail for project directories.
//!
//! Every project is its own repository. The workflow commits a backup
//! before each mutation and a labelled commit after it; commit failures are
//! reported by callers as warnings and never abort the step.

use std::path::Path;

use git2::{Oid, Repository, Signature};

fn normalize_pathspec(path: &str) -> String {
    let mut s = path
        .trim()
        .trim_end_matches('/')
        .trim_end_matches('\\')
        .to_string();

    s = s.replace('\\', "/");
    if let Some(stripped) = s.strip_prefix("./") {
        s = stripped.to_string();
    }
    while s.contains("//") {
        s = s.replace("//", "/");
    }

    s
}

/// Open the repository at `root`, initialising one on first use.
pub fn init_or_open(root: &Path) -> Result<Repository, git2::Error> {
    if root.join(".git").exists() {
        Repository::open(root)
    } else {
        Repository::init(root)
    }
}

/// Stage changes under `root` and commit them, returning the new `Oid`.
///
/// - `paths: Some` stages those pathspecs (directories recursively).
/// - `paths: None` behaves like `git add -A` against the whole tree.
/// - A tree identical to the parent's yields a "nothing to commit" error,
///   which callers treat as a non-event.
pub fn stage_and_commit(
    root: &Path,
    paths: Option<Vec<&str>>,
    message: &str,
) -> Result<Oid, git2::Error> {
    let repo = init_or_open(root)?;
    let mut index = repo.index()?;

    match paths {
        Some(paths) => {
            for raw in paths {
                let norm = normalize_pathspec(raw);
                let p = std::path::Path::new(&norm);
                if root.join(p).is_dir() {
                    index.add_all([p], git2::IndexAddOption::DEFAULT, None)?;
                } else {
                    index.add_path(p)?;
                }
            }
        }
        None => {
            index.add_all(["."], git2::IndexAddOption::DEFAULT, None)?;
            index.update_all(["."], None)?;
        }
    }

    index.write()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let signature = repo
        .signature()
        .or_else(|_| Signature::now("Atelier", "atelier@local"))?;

    let parent_commit = repo.head().ok().and_then(|h| h.peel_to_commit().ok());

    if let Some(ref parent) = parent_commit {
        if parent.tree_id() == tree_id {
            return Err(git2::Error::from_str("nothing to commit"));
        }
    }

    let parents: Vec<&git2::Commit> = match parent_commit.as_ref() {
        Some(p) => vec![p],
        None => vec![],
    };

    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn head_message(root: &Path) -> String {
        let repo = Repository::open(root).expect("open repo");
        let head = repo.head().expect("head");
        let commit = head.peel_to_commit().expect("commit");
        commit.message().unwrap_or_default().to_string()
    }

    #[test]
    fn init_then_commit_creates_history() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("index.html"), "<html></html>").expect("write");

        let oid = stage_and_commit(dir.path(), None, "Initial commit").expect("commit");
        assert!(!oid.is_zero());
        assert_eq!(head_message(dir.path()), "Initial commit");
    }

    #[test]
    fn unchanged_tree_is_nothing_to_commit() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.txt"), "same").expect("write");
        stage_and_commit(dir.path(), None, "first").expect("commit");

        let err = stage_and_commit(dir.path(), None, "again").expect_err("empty commit");
        assert!(err.message().contains("nothing to commit"));
    }

    #[test]
    fn commits_selected_paths_only() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("tracked.txt"), "yes").expect("write");
        fs::write(dir.path().join("loose.txt"), "no").expect("write");

        stage_and_commit(dir.path(), Some(vec!["tracked.txt"]), "track one").expect("commit");

        let repo = Repository::open(dir.path()).expect("open repo");
        let tree = repo
            .head()
            .expect("head")
            .peel_to_tree()
            .expect("tree");
        assert!(tree.get_name("tracked.txt").is_some());
        assert!(tree.get_name("loose.txt").is_none());
    }

    #[test]
    fn reopening_an_existing_repository_works() {
        let dir = tempdir().expect("tempdir");
        init_or_open(dir.path()).expect("init");
        init_or_open(dir.path()).expect("reopen");
    }
}
