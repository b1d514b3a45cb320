//! Publishing a built site into a deploy target directory.
//!
//! The target is typically a checkout of a `gh-pages` branch. Its contents are
//! replaced by the build output; a top-level `.git` is left in place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use folio_site::config::DeployConfig;

/// Errors that can occur while deploying.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Build output not found at {0}; run `folio build` first")]
    MissingBuild(PathBuf),

    #[error("No deploy target configured; set [deploy] target in site.toml")]
    NoTarget,

    #[error("Refusing to deploy into {0}: it overlaps the build directory")]
    TargetIsBuild(PathBuf),

    #[error("Refusing to deploy into {0}: it contains the site sources")]
    TargetContainsSources(PathBuf),

    #[error("Failed to deploy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Summary of a deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub target: PathBuf,
    /// Number of files written, including `.nojekyll` and `CNAME`
    pub files: usize,
}

/// Replace the contents of `target` with the build output.
///
/// `site_root` is the directory holding `site.toml`. The target may not be the
/// build directory, lie inside it, contain it, or contain the site root.
pub fn deploy(
    build_dir: &Path,
    target: &Path,
    site_root: &Path,
    config: &DeployConfig,
) -> Result<DeployReport, DeployError> {
    if !build_dir.is_dir() {
        return Err(DeployError::MissingBuild(build_dir.to_path_buf()));
    }

    let build = resolve(build_dir)?;
    let resolved = resolve(target)?;
    let root = resolve(site_root)?;

    if build.starts_with(&resolved) || resolved.starts_with(&build) {
        return Err(DeployError::TargetIsBuild(target.to_path_buf()));
    }
    if root.starts_with(&resolved) {
        return Err(DeployError::TargetContainsSources(target.to_path_buf()));
    }

    fs::create_dir_all(target).map_err(io_error(target))?;
    clear_target(target)?;

    let mut files = 0;

    for entry in WalkDir::new(build_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(build_dir).unwrap_or(path);
        let dest = target.join(relative);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::copy(path, &dest).map_err(io_error(&dest))?;
        files += 1;
    }

    if config.nojekyll {
        let path = target.join(".nojekyll");
        fs::write(&path, "").map_err(io_error(&path))?;
        files += 1;
    }

    if let Some(cname) = &config.cname {
        let path = target.join("CNAME");
        fs::write(&path, format!("{}\n", cname.trim())).map_err(io_error(&path))?;
        files += 1;
    }

    tracing::debug!("Deployed {} files to {}", files, target.display());

    Ok(DeployReport {
        target: target.to_path_buf(),
        files,
    })
}

/// Remove everything in the target except `.git`.
fn clear_target(target: &Path) -> Result<(), DeployError> {
    for entry in fs::read_dir(target).map_err(io_error(target))? {
        let entry = entry.map_err(io_error(target))?;
        let path = entry.path();

        if entry.file_name() == ".git" {
            continue;
        }

        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(io_error(&path))?;
    }
    Ok(())
}

/// Canonicalize `path`, allowing trailing components that do not exist yet.
fn resolve(path: &Path) -> Result<PathBuf, DeployError> {
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };

    let mut existing = path;
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            _ => break,
        }
    }

    let mut resolved = existing.canonicalize().map_err(io_error(existing))?;
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> DeployError + '_ {
    move |source| DeployError::Io {
        path: path.to_path_buf(),
        source,
    }
}
