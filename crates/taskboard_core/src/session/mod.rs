//! Session gate for protected page loads.
//!
//! # Responsibility
//! - Resolve the caller of a page request through a [`SessionProvider`].
//! - Turn a missing session into a temporary redirect to the landing page.
//!
//! # Invariants
//! - Resolution is a single point-in-time check with no retries.
//! - An anonymous caller is never reported as an error.

use crate::model::session::Session;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// Landing route every failed page load redirects to.
pub const LANDING_ROUTE: &str = "/";

/// Inbound page request as seen by page-load hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub path: String,
    /// Opaque session cookie value, when the caller sent one.
    pub session_token: Option<String>,
}

impl PageRequest {
    pub fn anonymous(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            session_token: None,
        }
    }

    pub fn with_token(path: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            session_token: Some(token.into()),
        }
    }
}

/// Identity provider boundary.
pub trait SessionProvider {
    /// Returns the caller's session, or `None` for anonymous callers.
    fn resolve(&self, request: &PageRequest) -> Option<Session>;
}

impl<P: SessionProvider + ?Sized> SessionProvider for &P {
    fn resolve(&self, request: &PageRequest) -> Option<Session> {
        (**self).resolve(request)
    }
}

/// Token table standing in for an external identity provider.
#[derive(Debug, Clone, Default)]
pub struct StaticSessionProvider {
    sessions: HashMap<String, Session>,
}

impl StaticSessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `session` under `token`, replacing any previous entry.
    pub fn insert(&mut self, token: impl Into<String>, session: Session) {
        self.sessions.insert(token.into(), session);
    }

    pub fn with_session(mut self, token: impl Into<String>, session: Session) -> Self {
        self.insert(token, session);
        self
    }
}

impl SessionProvider for StaticSessionProvider {
    fn resolve(&self, request: &PageRequest) -> Option<Session> {
        let token = request.session_token.as_deref()?;
        self.sessions.get(token).cloned()
    }
}

/// Redirect response produced instead of page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub destination: String,
    pub permanent: bool,
}

impl Redirect {
    /// Temporary redirect to the landing page.
    pub fn to_landing() -> Self {
        Self {
            destination: LANDING_ROUTE.to_string(),
            permanent: false,
        }
    }
}

/// Outcome of a page-load hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLoad<P> {
    Render(P),
    Redirect(Redirect),
}

impl<P> PageLoad<P> {
    pub fn redirect_to_landing() -> Self {
        Self::Redirect(Redirect::to_landing())
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }

    /// Returns the props when the page renders.
    pub fn into_props(self) -> Option<P> {
        match self {
            Self::Render(props) => Some(props),
            Self::Redirect(_) => None,
        }
    }

    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> PageLoad<Q> {
        match self {
            Self::Render(props) => PageLoad::Render(f(props)),
            Self::Redirect(redirect) => PageLoad::Redirect(redirect),
        }
    }
}

/// Resolves the caller or redirects to the landing page.
pub fn require_session<P: SessionProvider>(
    provider: &P,
    request: &PageRequest,
) -> PageLoad<Session> {
    match provider.resolve(request) {
        Some(session) => PageLoad::Render(session),
        None => {
            debug!(
                "event=session_gate module=session status=redirect path={}",
                request.path
            );
            PageLoad::redirect_to_landing()
        }
    }
}
