//! Top-level navigation targets.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    MyRequests,
    Settings,
    Performance,
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        match path.trim_end_matches('/') {
            "" => Self::Home,
            "/login" => Self::Login,
            "/my-requests" => Self::MyRequests,
            "/settings" => Self::Settings,
            "/performance" => Self::Performance,
            _ => Self::NotFound,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::MyRequests => "/my-requests",
            Self::Settings => "/settings",
            Self::Performance => "/performance",
            Self::NotFound => "*",
        }
    }

    /// Whether the route needs a session token.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::Home | Self::MyRequests | Self::Settings | Self::Performance
        )
    }

    /// The route actually shown: protected routes fall back to login.
    pub fn resolve(self, authenticated: bool) -> Self {
        if self.is_protected() && !authenticated {
            Self::Login
        } else {
            self
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
