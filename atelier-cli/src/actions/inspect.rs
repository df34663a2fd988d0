use std::error::Error;
use std::path::Path;

use atelier_core::project::SessionMeta;
use atelier_core::store::ArtifactStore;
use atelier_core::workflow::NO_PROJECT_MESSAGE;

fn store_for(meta: &SessionMeta) -> Result<ArtifactStore, Box<dyn Error>> {
    match &meta.app_path {
        Some(path) if path.is_dir() => Ok(ArtifactStore::open(path.clone())?),
        _ => Err(NO_PROJECT_MESSAGE.into()),
    }
}

fn resolve(store: &ArtifactStore, artifact: &str) -> Result<String, Box<dyn Error>> {
    store
        .resolve(artifact)?
        .ok_or_else(|| format!("no artifact matching `{artifact}` in the project").into())
}

pub fn info(session_path: &Path) -> Result<(), Box<dyn Error>> {
    let meta = SessionMeta::load(session_path)?;

    match &meta.app_path {
        Some(path) => println!("project: {}", path.display()),
        None => {
            println!("{NO_PROJECT_MESSAGE}");
            return Ok(());
        }
    }
    if let Some(infos) = &meta.infos {
        print!("{}", infos.to_yaml()?);
    }
    if meta.plan.is_some() {
        println!("plan: stored");
    }
    Ok(())
}

pub fn history(session_path: &Path, artifact: &str) -> Result<(), Box<dyn Error>> {
    let meta = SessionMeta::load(session_path)?;
    let store = store_for(&meta)?;
    let name = resolve(&store, artifact)?;

    let snapshots = store.history(&name)?;
    if snapshots.is_empty() {
        println!("{name}: no stored revisions");
        return Ok(());
    }
    for snapshot in snapshots {
        println!("{:>6}  {} bytes", snapshot.revision, snapshot.data.len());
    }
    Ok(())
}

pub fn show(session_path: &Path, artifact: &str, revision: Option<u64>) -> Result<(), Box<dyn Error>> {
    let meta = SessionMeta::load(session_path)?;
    let store = store_for(&meta)?;
    let name = resolve(&store, artifact)?;

    match revision {
        None => {
            let Some(content) = store.read(&name)? else {
                return Err(format!("{name} does not exist").into());
            };
            print!("{content}");
        }
        Some(revision) => {
            let snapshot = store
                .history(&name)?
                .into_iter()
                .find(|s| s.revision == revision)
                .ok_or_else(|| format!("{name} has no revision {revision}"))?;
            print!("{}", snapshot.text());
        }
    }
    Ok(())
}
