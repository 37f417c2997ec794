//! The route table. Three paths, no nesting, no guards; anything else matches
//! nothing and the shell renders an empty page.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Route {
    Index,
    Venues,
    Events,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Index, Route::Venues, Route::Events];

    /// Match a location against the table. Matching ignores case and trailing
    /// slashes, so `/Venues/` still lands on the venue screen.
    pub fn resolve(location: &str) -> Option<Self> {
        let trimmed = location.trim();
        let path = trimmed.trim_end_matches('/');
        let path = if path.is_empty() && trimmed.starts_with('/') {
            "/"
        } else {
            path
        };

        Route::ALL
            .into_iter()
            .find(|route| route.path().eq_ignore_ascii_case(path))
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Index => "/",
            Route::Venues => "/venues",
            Route::Events => "/events",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Index => "Home",
            Route::Venues => "Venues",
            Route::Events => "Events",
        }
    }
}
