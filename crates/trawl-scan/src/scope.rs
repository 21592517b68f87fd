//! Mapping working directories to log storage directories.
//!
//! Each project's logs live in `<projects-dir>/<name>/`, where `<name>` is
//! the working directory with its leading `/` dropped, every other `/`
//! turned into `-`, and a single `-` prefixed:
//! `/Users/x/proj` → `-Users-x-proj`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Which projects' logs a query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The current working directory only
    Project,
    /// The parent of the current working directory
    Parent,
    /// Every directory nested below the current working directory
    Children,
    /// Every project
    Personal,
    /// Every project (same as `Personal`)
    All,
}

impl Scope {
    pub const NAMES: [&'static str; 5] = ["project", "parent", "children", "personal", "all"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Project => "project",
            Scope::Parent => "parent",
            Scope::Children => "children",
            Scope::Personal => "personal",
            Scope::All => "all",
        }
    }

    /// Whether resolving this scope needs a working directory.
    pub fn needs_cwd(&self) -> bool {
        matches!(self, Scope::Project | Scope::Parent | Scope::Children)
    }
}

#[derive(Debug, Error)]
#[error("unknown scope '{0}' (expected one of: project, parent, children, personal, all)")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(Scope::Project),
            "parent" => Ok(Scope::Parent),
            "children" => Ok(Scope::Children),
            "personal" => Ok(Scope::Personal),
            "all" => Ok(Scope::All),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage directory name for a working directory.
pub fn project_dir_name(cwd: &Path) -> String {
    let cwd = cwd.to_string_lossy();
    format!("-{}", cwd.trim_start_matches('/').replace('/', "-"))
}

/// Best-effort reverse of [`project_dir_name`].
///
/// Lossy: a dash that was part of a directory name comes back as `/`.
pub fn project_name_to_cwd(name: &str) -> String {
    let name = name.strip_prefix('-').unwrap_or(name);
    format!("/{}", name.replace('-', "/"))
}

/// Resolve a scope to the storage directories it covers, sorted by name.
///
/// Never fails: a missing projects directory or an unmatched project
/// yields an empty list.
pub fn resolve_scope(scope: Scope, cwd: &Path, projects_dir: &Path) -> Vec<PathBuf> {
    match scope {
        Scope::Personal | Scope::All => project_dirs(projects_dir),
        Scope::Project => existing(projects_dir.join(project_dir_name(cwd))),
        Scope::Parent => {
            let parent = cwd.parent().unwrap_or(cwd);
            existing(projects_dir.join(project_dir_name(parent)))
        }
        Scope::Children => {
            let prefix = format!("{}-", project_dir_name(cwd));
            project_dirs(projects_dir)
                .into_iter()
                .filter(|dir| {
                    dir.file_name()
                        .map(|n| n.to_string_lossy().starts_with(&prefix))
                        .unwrap_or(false)
                })
                .collect()
        }
    }
}

fn existing(dir: PathBuf) -> Vec<PathBuf> {
    if dir.is_dir() {
        vec![dir]
    } else {
        tracing::debug!(dir = %dir.display(), "no log directory for scope");
        Vec::new()
    }
}

/// Every immediate subdirectory of the projects directory.
fn project_dirs(projects_dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(projects_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %projects_dir.display(), error = %e, "cannot list projects directory");
            return Vec::new();
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TempProjects;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_project_dir_name_round_trip() {
        let name = project_dir_name(Path::new("/Users/a/proj"));
        assert_eq!(name, "-Users-a-proj");
        assert_eq!(project_name_to_cwd(&name), "/Users/a/proj");
    }

    #[test]
    fn test_project_dir_name_keeps_dashes_lossy() {
        let name = project_dir_name(Path::new("/home/me/my-app"));
        assert_eq!(name, "-home-me-my-app");
        assert_eq!(project_name_to_cwd(&name), "/home/me/my/app");
    }

    #[test]
    fn test_scope_from_str() {
        for name in Scope::NAMES {
            let scope: Scope = name.parse().unwrap();
            assert_eq!(scope.as_str(), name);
        }
        assert!("everything".parse::<Scope>().is_err());
    }

    #[test]
    fn test_resolve_scopes() {
        let projects = TempProjects::new();
        projects.project("-work-app");
        projects.project("-work-app-api");
        projects.project("-work-app-web");
        projects.project("-work");
        projects.project("-other");
        let root = projects.root();

        let names = |dirs: Vec<PathBuf>| -> Vec<String> {
            dirs.iter()
                .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };

        let cwd = Path::new("/work/app");
        assert_eq!(names(resolve_scope(Scope::Project, cwd, root)), vec!["-work-app"]);
        assert_eq!(names(resolve_scope(Scope::Parent, cwd, root)), vec!["-work"]);
        assert_eq!(
            names(resolve_scope(Scope::Children, cwd, root)),
            vec!["-work-app-api", "-work-app-web"]
        );
        assert_eq!(resolve_scope(Scope::All, cwd, root).len(), 5);
        assert_eq!(
            resolve_scope(Scope::Personal, cwd, root),
            resolve_scope(Scope::All, cwd, root)
        );
    }

    #[test]
    fn test_resolve_scope_without_matches_is_empty() {
        let projects = TempProjects::new();
        let root = projects.root();
        assert!(resolve_scope(Scope::Project, Path::new("/nowhere"), root).is_empty());

        let missing = root.join("does-not-exist");
        assert!(resolve_scope(Scope::All, Path::new("/"), &missing).is_empty());
        assert!(resolve_scope(Scope::Children, Path::new("/"), &missing).is_empty());
    }
}
