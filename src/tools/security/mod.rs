//! Security utilities for tool execution.
//!
//! ## Path Containment
//!
//! The [`PathGuard`] pins every filesystem and process access to one working
//! directory:
//!
//! ```rust,ignore
//! use sandbox_agent::tools::security::PathGuard;
//!
//! let guard = PathGuard::new("/home/user/project")?;
//!
//! match guard.resolve("src/main.rs") {
//!     Ok(resolved) => println!("Resolved: {}", resolved.as_path().display()),
//!     Err(e) => eprintln!("Rejected: {}", e),
//! }
//! ```
//!
//! Rejected inputs include parent traversal (`../x`), absolute paths outside
//! the root (`/etc/passwd`), sibling directories sharing a name prefix, and
//! symlinks pointing out of the root.

mod path;

pub use path::{ContainmentError, ContainmentErrorKind, PathGuard, ResolvedPath, RootError};
