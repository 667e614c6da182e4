//! Stage-then-commit writer for generated files.

use std::fs;
use std::path::{Path, PathBuf};

use dot_fsm_codegen::{Artifacts, GenConfig, INC_DIR, SRC_DIR};

use crate::Error;

/// Writes every artifact below `outdir` and returns the paths written.
///
/// Files are first written into a staging directory inside `outdir` and only
/// renamed into place once all of them were written, so a failure while
/// writing leaves the previous output untouched. The renames themselves are
/// not atomic as a group: an error there can leave some files updated.
/// Machine files (`FSM<n>.hpp`/`FSM<n>.cpp`) from an earlier run that are not
/// part of this one are removed after the commit. With
/// [`GenConfig::preserve_user_sources`] set, an existing user-editable file is
/// left untouched.
pub fn write_output(outdir: impl AsRef<Path>, artifacts: &Artifacts, config: &GenConfig) -> Result<Vec<PathBuf>, Error> {
    let outdir = outdir.as_ref();
    for dir in [outdir.to_path_buf(), outdir.join(INC_DIR), outdir.join(SRC_DIR)] {
        fs::create_dir_all(&dir).map_err(Error::io("cannot create directory", &dir))?;
    }

    let staging = tempfile::Builder::new()
        .prefix(".dot-fsm-")
        .tempdir_in(outdir)
        .map_err(Error::io("cannot create staging directory in", outdir))?;
    for dir in [INC_DIR, SRC_DIR] {
        let dir = staging.path().join(dir);
        fs::create_dir_all(&dir).map_err(Error::io("cannot create directory", &dir))?;
    }

    let mut staged = Vec::with_capacity(artifacts.len());
    for artifact in artifacts.iter() {
        let target = outdir.join(&artifact.path);
        if artifact.user_editable && config.preserve_user_sources && target.exists() {
            tracing::info!(path = %target.display(), "keeping existing user file");
            continue;
        }

        let path = staging.path().join(&artifact.path);
        fs::write(&path, &artifact.contents).map_err(Error::io("cannot write", &path))?;
        staged.push((path, target));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (from, to) in staged {
        fs::rename(&from, &to).map_err(Error::io("cannot move generated file to", &to))?;
        tracing::info!(path = %to.display(), "wrote");
        written.push(to);
    }

    remove_stale_machines(outdir, &written)?;

    staging
        .close()
        .map_err(Error::io("cannot remove staging directory in", outdir))?;
    Ok(written)
}

/// `FSM<n>.hpp` in `Inc/` or `FSM<n>.cpp` in `Src/`.
fn is_machine_file(dir: &str, name: &str) -> bool {
    let extension = if dir == INC_DIR { ".hpp" } else { ".cpp" };
    name.strip_prefix("FSM")
        .and_then(|rest| rest.strip_suffix(extension))
        .is_some_and(|number| !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()))
}

fn remove_stale_machines(outdir: &Path, written: &[PathBuf]) -> Result<(), Error> {
    for dir in [INC_DIR, SRC_DIR] {
        let path = outdir.join(dir);
        let entries = fs::read_dir(&path).map_err(Error::io("cannot list", &path))?;
        for entry in entries {
            let entry = entry.map_err(Error::io("cannot list", &path))?;
            let stale = entry.path();
            let is_stale = entry
                .file_name()
                .to_str()
                .is_some_and(|name| is_machine_file(dir, name))
                && !written.contains(&stale);
            if is_stale {
                fs::remove_file(&stale).map_err(Error::io("cannot remove stale file", &stale))?;
                tracing::info!(path = %stale.display(), "removed stale machine file");
            }
        }
    }
    Ok(())
}
