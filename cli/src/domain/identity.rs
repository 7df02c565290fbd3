//! Project identity: turns a remote URL or workspace path into an identifier
//! that is safe both as a container-name suffix and as a directory name.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::fmt;
use std::path::Path;

use serde::Serialize;

/// Returned when nothing safe survives sanitization.
pub const FALLBACK_IDENTIFIER: &str = "unknown-repo";

/// Maximum identifier length in bytes (all identifier bytes are ASCII).
pub const MAX_IDENTIFIER_LEN: usize = 100;

/// Prefix of every container name derived from a project identity.
pub const CONTAINER_PREFIX: &str = "capsule-";

const URL_SCHEMES: &[&str] = &["https://", "http://", "git://", "ssh://"];

/// Stable, sanitized identity of a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProjectIdentity(String);

impl ProjectIdentity {
    /// Derive the identity from the workspace's remote URL when known, else
    /// from its absolute path.
    #[must_use]
    pub fn derive(remote_url: Option<&str>, workspace: &Path) -> Self {
        match remote_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => normalize(url),
            None => normalize(&workspace.to_string_lossy()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Container name for this project, e.g. `capsule-github.com-user-repo`.
    #[must_use]
    pub fn container_name(&self) -> String {
        format!("{CONTAINER_PREFIX}{}", self.0)
    }
}

impl fmt::Display for ProjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a project reference (path or remote URL) into an identifier.
///
/// The result is non-empty, matches `^[A-Za-z0-9._-]{1,100}$`, never starts or
/// ends with `-`, and is never `.` or `..`.
#[must_use]
pub fn normalize(reference: &str) -> ProjectIdentity {
    let trimmed = reference.trim();
    let path_like = if is_remote_url(trimmed) {
        strip_remote(trimmed)
    } else {
        trimmed.to_string()
    };
    ProjectIdentity(sanitize(&path_like))
}

/// `true` for `scheme://…` remotes and scp-style `user@host:path` remotes.
fn is_remote_url(reference: &str) -> bool {
    if URL_SCHEMES.iter().any(|s| reference.starts_with(s)) {
        return true;
    }
    let Some((user, rest)) = reference.split_once('@') else {
        return false;
    };
    let Some((host, path)) = rest.split_once(':') else {
        return false;
    };
    !user.is_empty()
        && !user.contains(['/', '\\'])
        && !host.is_empty()
        && !host.contains(['/', '\\'])
        && !path.is_empty()
}

/// Strip scheme, user and `.git` suffix; turn `host:path` into `host/path`.
fn strip_remote(url: &str) -> String {
    let mut rest = URL_SCHEMES
        .iter()
        .find_map(|s| url.strip_prefix(s))
        .unwrap_or(url);

    // user@ only counts when it precedes the first path separator.
    if let Some(at) = rest.find('@') {
        if rest.find('/').is_none_or(|slash| at < slash) {
            rest = &rest[at + 1..];
        }
    }

    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    rest.replace(':', "/")
}

/// Apply the separator/charset/length rules to an arbitrary string.
fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_whitespace = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        match ch {
            '/' | '\\' | ':' | '@' => out.push('-'),
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') => out.push(c),
            _ => {}
        }
    }

    let mut collapsed = String::with_capacity(out.len());
    for ch in out.chars() {
        if ch == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(ch);
    }

    let mut id = collapsed.trim_matches('-').to_string();
    if id.len() > MAX_IDENTIFIER_LEN {
        id.truncate(MAX_IDENTIFIER_LEN);
        let keep = id.trim_end_matches('-').len();
        id.truncate(keep);
    }

    // "." and ".." would escape the repos directory.
    if id.is_empty() || id.chars().all(|c| c == '.') {
        return FALLBACK_IDENTIFIER.to_string();
    }
    id
}
