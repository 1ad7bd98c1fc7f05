//! Writes `firebase.json` and `.firebaserc`
//!
//! Each file is serialized into a temp file in the target directory and then
//! renamed over the destination, so readers only ever see a complete document
//! and a rerun overwrites instead of appending.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::hosting::{FirebaseJson, FirebaseRc, FIREBASE_JSON, FIREBASE_RC};
use crate::error::ConfigWriteError;

/// Paths written by a successful `write_hosting_config`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenConfig {
    pub firebase_json: PathBuf,
    pub firebase_rc: PathBuf,
}

/// Write both hosting files into `dir`, creating it if needed
pub fn write_hosting_config(
    dir: &Path,
    hosting: &FirebaseJson,
    project: &FirebaseRc,
) -> Result<WrittenConfig, ConfigWriteError> {
    fs::create_dir_all(dir).map_err(|source| ConfigWriteError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let firebase_json = dir.join(FIREBASE_JSON);
    write_json_atomic(&firebase_json, hosting)?;

    let firebase_rc = dir.join(FIREBASE_RC);
    write_json_atomic(&firebase_rc, project)?;

    Ok(WrittenConfig {
        firebase_json,
        firebase_rc,
    })
}

/// Serialize `value` as pretty JSON and atomically replace `path`
///
/// The temp file handle is owned by `NamedTempFile`: on any early return it is
/// closed and the temp file removed.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigWriteError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let write_err = |source: std::io::Error| ConfigWriteError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut body = serde_json::to_vec_pretty(value).map_err(|source| {
        ConfigWriteError::Serialize {
            file: file_name.clone(),
            source,
        }
    })?;
    body.push(b'\n');

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(&body).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} ({} bytes)", path.display(), body.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HostingOptions;

    fn render(build: &Path, dir: &Path) -> FirebaseJson {
        FirebaseJson::render(&HostingOptions::default(), build, dir, None)
    }

    #[test]
    fn test_writes_parseable_documents() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("dist");
        fs::create_dir(&build).unwrap();

        let written = write_hosting_config(
            dir.path(),
            &render(&build, dir.path()),
            &FirebaseRc::for_project("ops-dashboard"),
        )
        .unwrap();

        let hosting: FirebaseJson =
            serde_json::from_str(&fs::read_to_string(&written.firebase_json).unwrap()).unwrap();
        assert_eq!(hosting.hosting.public, "dist");

        let rc: FirebaseRc =
            serde_json::from_str(&fs::read_to_string(&written.firebase_rc).unwrap()).unwrap();
        assert_eq!(rc.projects["default"], "ops-dashboard");
    }

    #[test]
    fn test_rewrite_overwrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("dist");
        fs::create_dir(&build).unwrap();
        let doc = render(&build, dir.path());
        let rc = FirebaseRc::for_project("ops-dashboard");

        let first = write_hosting_config(dir.path(), &doc, &rc).unwrap();
        let before = fs::read_to_string(&first.firebase_json).unwrap();
        write_hosting_config(dir.path(), &doc, &rc).unwrap();
        let after = fs::read_to_string(&first.firebase_json).unwrap();

        assert_eq!(before, after);
        assert!(serde_json::from_str::<FirebaseJson>(&after).is_ok());

        // Only the two documents remain, no stray temp files
        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|n| n != "dist")
            .collect();
        names.sort();
        assert_eq!(names, vec![".firebaserc", "firebase.json"]);
    }

    #[test]
    fn test_creates_missing_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deploy").join("hosting");
        let written = write_hosting_config(
            &nested,
            &render(dir.path(), &nested),
            &FirebaseRc::for_project("ops-dashboard"),
        )
        .unwrap();
        assert!(written.firebase_json.exists());
    }

    #[test]
    fn test_config_dir_under_a_file_is_create_dir_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let result = write_hosting_config(
            &blocker.join("sub"),
            &render(dir.path(), dir.path()),
            &FirebaseRc::for_project("ops-dashboard"),
        );
        assert!(matches!(result, Err(ConfigWriteError::CreateDir { .. })));
    }

    #[test]
    fn test_destination_is_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("firebase.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "").unwrap();

        let result = write_json_atomic(&target, &FirebaseRc::for_project("ops-dashboard"));
        assert!(matches!(result, Err(ConfigWriteError::Write { .. })));

        // the failed rename leaves no temp file behind
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
