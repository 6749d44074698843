//! Path to route resolution.

/// Where a request path leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// The root index page.
    Index,
    /// A repository page, carrying the first path segment.
    Repository(&'a str),
}

impl<'a> Route<'a> {
    /// Resolve a URL path.
    pub fn from_path(path: &'a str) -> Self {
        let path = path.strip_prefix('/').unwrap_or(path);
        if path.is_empty() {
            return Route::Index;
        }
        let repo = path.split_once('/').map_or(path, |(repo, _)| repo);
        Route::Repository(repo)
    }

    /// Repository name, if this is a repository route.
    pub fn repo(&self) -> Option<&'a str> {
        match self {
            Route::Index => None,
            Route::Repository(repo) => Some(repo),
        }
    }

    /// Label used for metrics.
    pub fn page(&self) -> &'static str {
        match self {
            Route::Index => "index",
            Route::Repository(_) => "module",
        }
    }
}
