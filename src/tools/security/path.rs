//! Path containment for the working directory.
//!
//! Provides `PathGuard`, which resolves caller-supplied paths against a fixed
//! working-directory root and rejects anything that lands outside it.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Error returned when a path cannot be proven to lie under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainmentError {
    /// The path exactly as the caller supplied it.
    pub path: String,
    /// Why the path was rejected.
    pub kind: ContainmentErrorKind,
}

/// Specific containment failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainmentErrorKind {
    /// The resolved path lies outside the working directory.
    OutsideRoot {
        /// The resolved absolute path.
        resolved: PathBuf,
    },
    /// The path could not be resolved (permission denied, dangling symlink, ...).
    Unresolvable {
        /// The underlying reason.
        reason: String,
    },
}

impl ContainmentError {
    /// Creates an outside-root error.
    #[must_use]
    pub fn outside_root(path: impl Into<String>, resolved: PathBuf) -> Self {
        Self {
            path: path.into(),
            kind: ContainmentErrorKind::OutsideRoot { resolved },
        }
    }

    /// Creates an unresolvable-path error.
    #[must_use]
    pub fn unresolvable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ContainmentErrorKind::Unresolvable {
                reason: reason.into(),
            },
        }
    }

    /// Returns true if the path resolved to a location outside the root.
    #[must_use]
    pub fn is_outside_root(&self) -> bool {
        matches!(self.kind, ContainmentErrorKind::OutsideRoot { .. })
    }
}

impl fmt::Display for ContainmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ContainmentErrorKind::OutsideRoot { .. } => write!(
                f,
                "\"{}\" is outside the permitted working directory",
                self.path
            ),
            ContainmentErrorKind::Unresolvable { reason } => write!(
                f,
                "cannot resolve \"{}\" inside the working directory: {}",
                self.path, reason
            ),
        }
    }
}

impl std::error::Error for ContainmentError {}

/// Error returned when the working directory itself is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootError {
    /// The root that was supplied.
    pub root: PathBuf,
    /// Why it was rejected.
    pub reason: String,
}

impl fmt::Display for RootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "working directory '{}' is unusable: {}; pass an existing directory",
            self.root.display(),
            self.reason
        )
    }
}

impl std::error::Error for RootError {}

/// A path that has been proven to lie on or under the working directory.
///
/// Only `PathGuard::resolve` can construct one, so every tool primitive that
/// takes a `ResolvedPath` has gone through the containment check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    /// Returns the absolute resolved path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Resolves relative paths against a canonical working-directory root.
///
/// The root is canonicalized once at construction and never changes. Every
/// candidate is joined onto it, normalized, and canonicalized through its
/// deepest existing ancestor (so symlinks are followed) before the
/// component-wise containment check. A root of `/a/b` therefore never admits
/// `/a/bc`.
///
/// # Example
///
/// ```rust,ignore
/// use sandbox_agent::tools::security::PathGuard;
///
/// let guard = PathGuard::new("/work")?;
/// let inside = guard.resolve("sub/new.txt")?;
/// assert!(guard.resolve("../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Creates a guard for the given working directory.
    ///
    /// # Errors
    ///
    /// Returns `RootError` if the root cannot be canonicalized or is not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, RootError> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|e| RootError {
            root: root.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !canonical.is_dir() {
            return Err(RootError {
                root: root.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        Ok(Self { root: canonical })
    }

    /// Returns the canonical working directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a caller-supplied path and proves it lies under the root.
    ///
    /// The target does not need to exist. Absolute inputs replace the root on
    /// join and are then rejected unless they still land inside it. An empty
    /// path or `.` resolves to the root itself.
    ///
    /// # Errors
    ///
    /// Returns `ContainmentError` if the path escapes the root or cannot be resolved.
    pub fn resolve(&self, relative: &str) -> Result<ResolvedPath, ContainmentError> {
        let joined = normalize_lexically(&self.root.join(relative));
        let resolved = canonicalize_existing_prefix(&joined)
            .map_err(|e| ContainmentError::unresolvable(relative, e.to_string()))?;

        if !resolved.starts_with(&self.root) {
            tracing::warn!(
                path = %relative,
                resolved = %resolved.display(),
                root = %self.root.display(),
                "rejected path outside working directory"
            );
            return Err(ContainmentError::outside_root(relative, resolved));
        }

        tracing::debug!(path = %relative, resolved = %resolved.display(), "resolved path");
        Ok(ResolvedPath(resolved))
    }
}

/// Removes `.` and folds `..` without touching the filesystem.
///
/// `..` at the filesystem root stays at the root.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Canonicalizes the deepest existing ancestor and re-appends the rest.
///
/// A missing component that is actually a dangling symlink is refused, since
/// writing through it would create its target wherever it points.
fn canonicalize_existing_prefix(path: &Path) -> io::Result<PathBuf> {
    let mut missing: Vec<OsString> = Vec::new();
    let mut current = path;

    loop {
        match current.canonicalize() {
            Ok(mut canonical) => {
                for part in missing.iter().rev() {
                    canonical.push(part);
                }
                return Ok(canonical);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if current.symlink_metadata().is_ok() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("'{}' is a dangling symlink", current.display()),
                    ));
                }
                let name = current.file_name().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "no existing ancestor directory")
                })?;
                missing.push(name.to_os_string());
                current = current.parent().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "no existing ancestor directory")
                })?;
            }
            Err(e) => return Err(e),
        }
    }
}
