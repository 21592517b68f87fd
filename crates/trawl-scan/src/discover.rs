//! Cross-session queries: listing and searching every session in a scope.

use crate::filter::session_files;
use crate::quick::quick_metadata;
use crate::scope::{resolve_scope, Scope};
use crate::search::{search_session, Matcher};
use crate::time::parse_date_expr;
use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};
use trawl_format::{SearchResult, SessionQuickMetadata};

/// Inclusive bounds on a session's start time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub after: Option<DateTime<FixedOffset>>,
    pub before: Option<DateTime<FixedOffset>>,
}

impl DateRange {
    /// Resolve `--after` / `--before` expressions. An expression that cannot
    /// be resolved leaves that side unbounded.
    pub fn parse(after: Option<&str>, before: Option<&str>) -> Self {
        Self {
            after: after.and_then(|expr| bound("after", expr)),
            before: before.and_then(|expr| bound("before", expr)),
        }
    }

    pub fn contains(&self, ts: &DateTime<FixedOffset>) -> bool {
        if let Some(after) = &self.after {
            if ts < after {
                return false;
            }
        }
        if let Some(before) = &self.before {
            if ts > before {
                return false;
            }
        }
        true
    }
}

fn bound(which: &str, expr: &str) -> Option<DateTime<FixedOffset>> {
    let resolved = parse_date_expr(expr);
    if resolved.is_none() {
        tracing::warn!(bound = which, expr, "unrecognized date expression, ignoring");
    }
    resolved
}

/// Inputs to a discovery listing.
#[derive(Debug, Clone)]
pub struct DiscoverQuery {
    pub scope: Scope,
    /// Maximum sessions returned; 0 means unlimited
    pub limit: usize,
    /// Sessions skipped from the newest end before `limit` applies
    pub offset: usize,
    pub dates: DateRange,
    /// Working directory for scope resolution; the process cwd if unset
    pub cwd: Option<PathBuf>,
}

impl Default for DiscoverQuery {
    fn default() -> Self {
        Self {
            scope: Scope::Personal,
            limit: 20,
            offset: 0,
            dates: DateRange::default(),
            cwd: None,
        }
    }
}

/// Inputs to a cross-session search.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub case_sensitive: bool,
    pub scope: Scope,
    /// Maximum sessions returned; 0 means unlimited
    pub limit: usize,
    pub dates: DateRange,
    pub cwd: Option<PathBuf>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            case_sensitive: false,
            scope: Scope::All,
            limit: 10,
            dates: DateRange::default(),
            cwd: None,
        }
    }
}

/// List sessions in scope, newest first.
pub fn discover_sessions(projects_dir: &Path, query: &DiscoverQuery) -> Vec<SessionQuickMetadata> {
    let files = candidate_files(projects_dir, query.scope, query.cwd.as_deref());

    let mut sessions: Vec<SessionQuickMetadata> = files
        .iter()
        .filter_map(|path| quick_metadata(path))
        .filter(|meta| query.dates.contains(&meta.started_at))
        .collect();
    sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    paginate(sessions, query.offset, query.limit)
}

/// Search sessions in scope, newest first. Only sessions with at least one
/// match are returned.
pub fn search_sessions(projects_dir: &Path, query: &SearchQuery) -> Result<Vec<SearchResult>> {
    let matcher = Matcher::new(&query.text, query.case_sensitive)?;
    let files = candidate_files(projects_dir, query.scope, query.cwd.as_deref());

    let mut results = Vec::new();
    for path in &files {
        // Date filtering is cheap; do it before reading the whole file
        let Some(meta) = quick_metadata(path) else {
            continue;
        };
        if !query.dates.contains(&meta.started_at) {
            tracing::debug!(path = %path.display(), "outside date range");
            continue;
        }

        let matches = search_session(path, &matcher);
        if !matches.is_empty() {
            results.push(SearchResult::new(meta, matches));
        }
    }
    results.sort_by(|a, b| b.session.started_at.cmp(&a.session.started_at));

    Ok(paginate(results, 0, query.limit))
}

/// Session files for a scope, resolving the working directory when the
/// scope needs one.
fn candidate_files(projects_dir: &Path, scope: Scope, cwd: Option<&Path>) -> Vec<PathBuf> {
    let cwd = match cwd {
        Some(cwd) => cwd.to_path_buf(),
        None => match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => {
                if scope.needs_cwd() {
                    tracing::warn!(error = %e, "cannot determine current directory");
                }
                PathBuf::new()
            }
        },
    };

    let dirs = resolve_scope(scope, &cwd, projects_dir);
    tracing::debug!(scope = %scope, dirs = dirs.len(), "resolved scope");
    session_files(&dirs)
}

fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    let items = items.into_iter().skip(offset);
    if limit == 0 {
        items.collect()
    } else {
        items.take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assistant, user, TempProjects};
    use crate::time::start_of_day;
    use chrono::{Days, Local, NaiveTime};
    use pretty_assertions::assert_eq;

    /// RFC 3339 timestamp at local noon `days` days ago.
    fn days_ago(days: u64) -> String {
        let date = Local::now()
            .date_naive()
            .checked_sub_days(Days::new(days))
            .unwrap();
        let noon = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        noon.and_local_timezone(Local)
            .earliest()
            .unwrap()
            .to_rfc3339()
    }

    fn fixture() -> TempProjects {
        let projects = TempProjects::new();
        projects.session(
            "-work-app",
            "a.jsonl",
            &[
                user("2024-05-01T09:00:00Z", "Fix the login bug"),
                assistant("2024-05-01T09:10:00Z", "Fixed."),
            ],
        );
        projects.session(
            "-work-app",
            "b.jsonl",
            &[user("2024-05-03T09:00:00Z", "Add dark mode")],
        );
        projects.session(
            "-work-app-api",
            "c.jsonl",
            &[user("2024-05-02T09:00:00Z", "Fix the API rate limit")],
        );
        projects.session(
            "-other",
            "d.jsonl",
            &[user("2024-05-04T09:00:00Z", "Unrelated")],
        );
        // Excluded by the file filter
        projects.session("-other", "agent-1.jsonl", &[user("2024-05-05T09:00:00Z", "Fix")]);
        std::fs::write(projects.project("-other").join("tiny.jsonl"), "{}\n").unwrap();
        projects
    }

    fn previews(sessions: &[SessionQuickMetadata]) -> Vec<&str> {
        sessions.iter().map(|s| s.preview.as_str()).collect()
    }

    #[test]
    fn test_discover_all_newest_first() {
        let projects = fixture();
        let query = DiscoverQuery {
            limit: 0,
            ..DiscoverQuery::default()
        };
        let sessions = discover_sessions(projects.root(), &query);
        assert_eq!(
            previews(&sessions),
            vec!["Unrelated", "Add dark mode", "Fix the API rate limit", "Fix the login bug"]
        );
    }

    #[test]
    fn test_discover_scope_and_pagination() {
        let projects = fixture();
        let query = DiscoverQuery {
            scope: Scope::Children,
            cwd: Some(PathBuf::from("/work")),
            ..DiscoverQuery::default()
        };
        assert_eq!(discover_sessions(projects.root(), &query).len(), 3);

        let query = DiscoverQuery {
            scope: Scope::Project,
            cwd: Some(PathBuf::from("/work/app")),
            limit: 1,
            offset: 1,
            ..DiscoverQuery::default()
        };
        assert_eq!(
            previews(&discover_sessions(projects.root(), &query)),
            vec!["Fix the login bug"]
        );

        let query = DiscoverQuery {
            offset: 10,
            ..DiscoverQuery::default()
        };
        assert!(discover_sessions(projects.root(), &query).is_empty());
    }

    #[test]
    fn test_missing_projects_dir_is_empty() {
        let projects = TempProjects::new();
        let missing = projects.root().join("nope");
        assert!(discover_sessions(&missing, &DiscoverQuery::default()).is_empty());
        assert!(search_sessions(&missing, &SearchQuery::new("x"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_after_two_days_ago() {
        let projects = TempProjects::new();
        projects.session("-p", "old.jsonl", &[user(&days_ago(3), "three days back")]);
        projects.session("-p", "new.jsonl", &[user(&days_ago(1), "yesterday's work")]);

        let query = DiscoverQuery {
            dates: DateRange::parse(Some("2 days ago"), None),
            ..DiscoverQuery::default()
        };
        assert_eq!(
            previews(&discover_sessions(projects.root(), &query)),
            vec!["yesterday's work"]
        );
    }

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let start = start_of_day(day).unwrap();
        let range = DateRange {
            after: Some(start),
            before: Some(start),
        };
        assert!(range.contains(&start));
        assert!(!range.contains(&(start + chrono::Duration::seconds(1))));
        assert!(!range.contains(&(start - chrono::Duration::seconds(1))));

        let unbounded = DateRange::parse(Some("someday"), None);
        assert_eq!(unbounded, DateRange::default());
        assert!(unbounded.contains(&start));
    }

    #[test]
    fn test_search_sessions() {
        let projects = fixture();
        let results = search_sessions(projects.root(), &SearchQuery::new("fix")).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].session.preview, "Fix the API rate limit");
        assert_eq!(results[1].session.preview, "Fix the login bug");
        assert_eq!(results[1].match_count, 2);
        assert_eq!(results[1].matches[1].role, "assistant");
    }

    #[test]
    fn test_search_limit_and_case() {
        let projects = fixture();
        let mut query = SearchQuery::new("fix");
        query.limit = 1;
        assert_eq!(search_sessions(projects.root(), &query).unwrap().len(), 1);

        let mut query = SearchQuery::new("fix");
        query.case_sensitive = true;
        let results = search_sessions(projects.root(), &query).unwrap();
        assert_eq!(results.len(), 0);
    }

    #[test]
    fn test_search_caps_matches() {
        let projects = TempProjects::new();
        let lines: Vec<_> = (0..7)
            .map(|i| user(&format!("2024-05-01T09:00:0{i}Z"), "needle again"))
            .collect();
        projects.session("-p", "s.jsonl", &lines);

        let results = search_sessions(projects.root(), &SearchQuery::new("needle")).unwrap();
        assert_eq!(results[0].match_count, 7);
        assert_eq!(results[0].matches.len(), 5);
    }
}
