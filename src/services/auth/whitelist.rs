//! Public-route classifier.
//!
//! A static, ordered list of `{method, route}` entries decides which requests
//! skip strict enforcement. Built once at startup, read-only afterwards.
//!
//! Matching rule:
//! - `METHOD /path` is exact. The request path loses one trailing `/` (unless
//!   it is `/`) before comparison, so `/jobs` and `/jobs/` are the same route.
//! - `METHOD /path/*` is a prefix on `/path/` and needs at least one more
//!   character, so it matches `/path/abc` but not `/path` itself.
//! - `*` as the method matches every verb.
//! - Operation identifiers (route templates such as `/api/v1/jobs/{id}`) are
//!   compared against exact entries only. The literal path is tried first,
//!   the operation identifier second.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatch {
    Any,
    Exact(Method),
}

impl MethodMatch {
    fn matches(&self, method: &Method) -> bool {
        match self {
            MethodMatch::Any => true,
            MethodMatch::Exact(m) => m == method,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    Exact(String),
    /// Stored with its trailing `/`.
    Prefix(String),
}

impl RoutePattern {
    fn matches_path(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(route) => normalize(path) == route.as_str(),
            RoutePattern::Prefix(prefix) => path.len() > prefix.len() && path.starts_with(prefix),
        }
    }

    fn matches_operation(&self, operation: &str) -> bool {
        match self {
            RoutePattern::Exact(route) => operation == route.as_str(),
            RoutePattern::Prefix(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistEntry {
    pub method: MethodMatch,
    pub route: RoutePattern,
}

impl WhitelistEntry {
    pub fn exact(method: &str, route: &str) -> Result<Self, WhitelistError> {
        Ok(Self {
            method: parse_method(method)?,
            route: RoutePattern::Exact(normalize(route).to_string()),
        })
    }

    /// `prefix` is the route without the trailing `/`, e.g. `/api/v1/jobs`.
    pub fn prefix(method: &str, prefix: &str) -> Result<Self, WhitelistError> {
        let trimmed = prefix.trim_end_matches('/');
        Ok(Self {
            method: parse_method(method)?,
            route: RoutePattern::Prefix(format!("{trimmed}/")),
        })
    }
}

impl fmt::Display for WhitelistEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            MethodMatch::Any => f.write_str("*")?,
            MethodMatch::Exact(m) => write!(f, "{m}")?,
        }
        match &self.route {
            RoutePattern::Exact(route) => write!(f, " {route}"),
            RoutePattern::Prefix(prefix) => write!(f, " {prefix}*"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WhitelistError {
    #[error("invalid whitelist entry {0:?}: expected \"METHOD /path\" or \"METHOD /prefix/*\"")]
    Syntax(String),
    #[error("invalid HTTP method {0:?}")]
    Method(String),
}

/// Parses `GET /api/v1/jobs`, `GET /api/v1/jobs/*`, `* /health`.
impl FromStr for WhitelistEntry {
    type Err = WhitelistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(method), Some(route), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(WhitelistError::Syntax(s.to_string()));
        };
        if !route.starts_with('/') {
            return Err(WhitelistError::Syntax(s.to_string()));
        }

        match route.strip_suffix("/*") {
            Some(prefix) => Self::prefix(method, prefix),
            None if route.ends_with('*') => Err(WhitelistError::Syntax(s.to_string())),
            None => Self::exact(method, route),
        }
    }
}

fn parse_method(method: &str) -> Result<MethodMatch, WhitelistError> {
    if method == "*" {
        return Ok(MethodMatch::Any);
    }
    Method::from_bytes(method.as_bytes())
        .map(MethodMatch::Exact)
        .map_err(|_| WhitelistError::Method(method.to_string()))
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Identifiers a transport may surface for one request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteId<'a> {
    pub path: Option<&'a str>,
    pub operation: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    entries: Vec<WhitelistEntry>,
}

impl Whitelist {
    pub fn new(entries: Vec<WhitelistEntry>) -> Self {
        Self { entries }
    }

    /// Parse a comma-separated list of entries.
    pub fn parse(list: &str) -> Result<Self, WhitelistError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(WhitelistEntry::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Public routes of the Jobbly API.
    pub fn jobbly_defaults() -> Self {
        fn exact(method: MethodMatch, route: &str) -> WhitelistEntry {
            WhitelistEntry {
                method,
                route: RoutePattern::Exact(route.to_string()),
            }
        }
        fn prefix(method: MethodMatch, route: &str) -> WhitelistEntry {
            WhitelistEntry {
                method,
                route: RoutePattern::Prefix(format!("{route}/")),
            }
        }
        let post = || MethodMatch::Exact(Method::POST);
        let get = || MethodMatch::Exact(Method::GET);

        Self::new(vec![
            exact(post(), "/api/v1/auth/register"),
            exact(post(), "/api/v1/auth/login"),
            exact(post(), "/api/v1/auth/refresh-token"),
            exact(get(), "/api/v1/jobs"),
            prefix(get(), "/api/v1/jobs"),
            exact(get(), "/api/v1/companies"),
            prefix(get(), "/api/v1/companies"),
            exact(post(), "/api/v1/resumes/upload"),
            prefix(MethodMatch::Any, "/q/swagger-ui"),
            exact(MethodMatch::Any, "/q/openapi.json"),
            exact(MethodMatch::Any, "/health"),
        ])
    }

    pub fn entries(&self) -> &[WhitelistEntry] {
        &self.entries
    }

    /// Path-only form of `classify`.
    pub fn is_public(&self, method: &Method, route: &str) -> bool {
        self.classify(
            method,
            RouteId {
                path: Some(route),
                operation: None,
            },
        )
    }

    /// `true` when any entry matches; enforcement is then skipped.
    pub fn classify(&self, method: &Method, route: RouteId<'_>) -> bool {
        if let Some(path) = route.path {
            if self.first_match(method, |r| r.matches_path(path)).is_some() {
                return true;
            }
        }
        if let Some(operation) = route.operation {
            if self.first_match(method, |r| r.matches_operation(operation)).is_some() {
                return true;
            }
        }
        false
    }

    fn first_match(
        &self,
        method: &Method,
        route_matches: impl Fn(&RoutePattern) -> bool,
    ) -> Option<&WhitelistEntry> {
        self.entries
            .iter()
            .find(|e| e.method.matches(method) && route_matches(&e.route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[&str]) -> Whitelist {
        Whitelist::new(entries.iter().map(|e| e.parse().unwrap()).collect())
    }

    #[test]
    fn login_and_job_list_are_public() {
        let wl = list(&["POST /auth/login", "GET /jobs"]);
        assert!(wl.is_public(&Method::POST, "/auth/login"));
        assert!(wl.is_public(&Method::GET, "/jobs"));
    }

    #[test]
    fn fixed_method_does_not_match_other_verbs() {
        let wl = list(&["GET /jobs"]);
        assert!(!wl.is_public(&Method::DELETE, "/jobs"));
        assert!(!wl.is_public(&Method::POST, "/jobs"));
    }

    #[test]
    fn exact_entry_does_not_cover_single_resource_reads() {
        let wl = list(&["GET /jobs"]);
        assert!(!wl.is_public(&Method::GET, "/jobs/abc123"));
        assert!(!wl.is_public(&Method::GET, "/jobsearch"));
    }

    #[test]
    fn prefix_entry_covers_single_resource_reads() {
        let wl = list(&["GET /jobs", "GET /jobs/*"]);
        assert!(wl.is_public(&Method::GET, "/jobs/abc123"));
        assert!(wl.is_public(&Method::GET, "/jobs"));
        assert!(!wl.is_public(&Method::DELETE, "/jobs/abc123"));
    }

    #[test]
    fn prefix_entry_alone_does_not_cover_the_collection() {
        let wl = list(&["GET /jobs/*"]);
        assert!(!wl.is_public(&Method::GET, "/jobs"));
        assert!(!wl.is_public(&Method::GET, "/jobs/"));
        assert!(!wl.is_public(&Method::GET, "/jobsX"));
    }

    #[test]
    fn trailing_slash_is_ignored_for_exact_entries() {
        let wl = list(&["GET /jobs/"]);
        assert!(wl.is_public(&Method::GET, "/jobs"));
        assert!(wl.is_public(&Method::GET, "/jobs/"));
    }

    #[test]
    fn wildcard_method_matches_every_verb() {
        let wl = list(&["* /health"]);
        for m in [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS] {
            assert!(wl.is_public(&m, "/health"));
        }
    }

    #[test]
    fn empty_whitelist_is_never_public() {
        assert!(!Whitelist::default().is_public(&Method::GET, "/"));
    }

    #[test]
    fn operation_identifier_is_the_fallback() {
        let wl = list(&["GET /api.job.v1.JobPosting/ListJobPostings"]);
        let route = RouteId {
            path: Some("/some/unlisted/path"),
            operation: Some("/api.job.v1.JobPosting/ListJobPostings"),
        };
        assert!(wl.classify(&Method::GET, route));
        assert!(!wl.classify(&Method::POST, route));
    }

    #[test]
    fn operation_identifier_never_prefix_matches() {
        let wl = list(&["GET /jobs/*"]);
        let route = RouteId {
            path: None,
            operation: Some("/jobs/{id}"),
        };
        assert!(!wl.classify(&Method::GET, route));
    }

    #[test]
    fn no_identifier_is_not_public() {
        let wl = list(&["* /health"]);
        assert!(!wl.classify(&Method::GET, RouteId::default()));
    }

    #[test]
    fn parse_accepts_comma_separated_entries() {
        let wl = Whitelist::parse("GET /a, POST /b/* ,, * /c").unwrap();
        let rendered: Vec<String> = wl.entries().iter().map(|e| e.to_string()).collect();
        assert_eq!(rendered, vec!["GET /a", "POST /b/*", "* /c"]);
    }

    #[test]
    fn parse_rejects_bad_entries() {
        assert!(matches!(
            "GET".parse::<WhitelistEntry>(),
            Err(WhitelistError::Syntax(_))
        ));
        assert!(matches!(
            "GET jobs".parse::<WhitelistEntry>(),
            Err(WhitelistError::Syntax(_))
        ));
        assert!(matches!(
            "GET /jobs*".parse::<WhitelistEntry>(),
            Err(WhitelistError::Syntax(_))
        ));
        assert!(matches!(
            "G@T /jobs".parse::<WhitelistEntry>(),
            Err(WhitelistError::Method(_))
        ));
    }

    #[test]
    fn defaults_cover_auth_and_public_reads() {
        let wl = Whitelist::jobbly_defaults();
        assert_eq!(wl.entries().len(), 11);
        assert!(wl.is_public(&Method::POST, "/api/v1/auth/login"));
        assert!(wl.is_public(&Method::GET, "/api/v1/companies/42"));
        assert!(wl.is_public(&Method::HEAD, "/health"));
        assert!(!wl.is_public(&Method::GET, "/api/v1/auth/profile"));
        assert!(!wl.is_public(&Method::POST, "/api/v1/jobs"));
    }

    #[test]
    fn defaults_render_as_their_config_form() {
        let rendered: Vec<String> = Whitelist::jobbly_defaults()
            .entries()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            rendered,
            [
                "POST /api/v1/auth/register",
                "POST /api/v1/auth/login",
                "POST /api/v1/auth/refresh-token",
                "GET /api/v1/jobs",
                "GET /api/v1/jobs/*",
                "GET /api/v1/companies",
                "GET /api/v1/companies/*",
                "POST /api/v1/resumes/upload",
                "* /q/swagger-ui/*",
                "* /q/openapi.json",
                "* /health",
            ]
        );

        let reparsed = Whitelist::parse(&rendered.join(",")).unwrap();
        assert_eq!(reparsed.entries(), Whitelist::jobbly_defaults().entries());
    }
}
