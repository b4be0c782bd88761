//! The route table: every path the application answers, with the handler and
//! the permission a request needs before the handler runs.

use axum::{
    Router,
    extract::{MatchedPath, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{MethodRouter, get},
};
use log::{debug, warn};

use crate::handlers;
use crate::security::Permission;
use crate::types::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Plain,
    Hello,
    HelloJson,
    Login,
    Logout,
    WikiView,
    WikiPageAdd,
    WikiPageView,
    WikiPageEdit,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Home,
        Route::Plain,
        Route::Hello,
        Route::HelloJson,
        Route::Login,
        Route::Logout,
        Route::WikiView,
        Route::WikiPageAdd,
        Route::WikiPageView,
        Route::WikiPageEdit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Plain => "plain",
            Route::Hello => "hello",
            Route::HelloJson => "hello_json",
            Route::Login => "login",
            Route::Logout => "logout",
            Route::WikiView => "wiki_view",
            Route::WikiPageAdd => "wikipage_add",
            Route::WikiPageView => "wikipage_view",
            Route::WikiPageEdit => "wikipage_edit",
        }
    }

    pub fn pattern(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Plain => "/plain",
            Route::Hello => "/howdy/:first/:last",
            Route::HelloJson => "/howdy.json",
            Route::Login => "/login",
            Route::Logout => "/logout",
            Route::WikiView => "/wiki",
            Route::WikiPageAdd => "/wiki/add",
            Route::WikiPageView => "/wiki/:uid",
            Route::WikiPageEdit => "/wiki/:uid/edit",
        }
    }

    /// Permission required on the root ACL; `None` means public.
    pub fn permission(self) -> Option<Permission> {
        match self {
            Route::Hello | Route::WikiPageAdd | Route::WikiPageEdit => Some(Permission::Edit),
            Route::WikiView | Route::WikiPageView => Some(Permission::View),
            Route::Home | Route::Plain | Route::HelloJson | Route::Login | Route::Logout => None,
        }
    }

    /// Methods and handler serving this route.
    pub fn handler(self) -> MethodRouter<AppState> {
        match self {
            Route::Home => get(handlers::home),
            Route::Plain => get(handlers::plain),
            Route::Hello => get(handlers::hello),
            Route::HelloJson => get(handlers::hello_json),
            Route::Login => get(handlers::login).post(handlers::login),
            Route::Logout => get(handlers::logout),
            Route::WikiView => get(handlers::wiki_view),
            Route::WikiPageAdd => get(handlers::wikipage_add).post(handlers::wikipage_add),
            Route::WikiPageView => get(handlers::wikipage_view),
            Route::WikiPageEdit => get(handlers::wikipage_edit).post(handlers::wikipage_edit),
        }
    }

    pub fn from_pattern(pattern: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.pattern() == pattern)
    }

    pub fn from_name(name: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Build a path by filling `:param` segments in order.
    pub fn url(self, params: &[&str]) -> String {
        let mut params = params.iter();
        let segments: Vec<&str> = self
            .pattern()
            .split('/')
            .map(|segment| {
                if segment.starts_with(':') {
                    params.next().copied().unwrap_or("")
                } else {
                    segment
                }
            })
            .collect();
        let path = segments.join("/");
        if path.is_empty() { "/".to_string() } else { path }
    }
}

/// Assemble the router from the route table.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new();
    for route in Route::ALL {
        router = router.route(route.pattern(), route.handler());
    }
    router
        .route_layer(middleware::from_fn_with_state(state.clone(), authorize))
        .with_state(state)
}

/// Resolve the caller and enforce the matched route's permission.
///
/// The resolved `RequestAuth` is handed to handlers as a request extension.
pub async fn authorize(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let auth = state.security.authenticate(request.headers());
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .and_then(|matched| Route::from_pattern(matched.as_str()));

    // Paths missing from the table have no declared permission and are refused.
    let Some(route) = route else {
        warn!("Denied {} {}: not in the route table", request.method(), request.uri().path());
        let came_from = request.uri().to_string();
        return handlers::forbidden(&state, &auth, &came_from);
    };

    if let Some(permission) = route.permission() {
        if !state.security.permits_root(&auth, permission) {
            warn!(
                "Denied '{}' on {} to {:?}",
                permission,
                route.name(),
                auth.userid().unwrap_or("anonymous")
            );
            let came_from = request.uri().to_string();
            return handlers::forbidden(&state, &auth, &came_from);
        }
    }
    debug!("{} {} as {:?}", request.method(), route.name(), auth.userid());

    request.extensions_mut().insert(auth);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_fill_parameters() {
        assert_eq!(Route::Home.url(&[]), "/");
        assert_eq!(Route::WikiView.url(&[]), "/wiki");
        assert_eq!(Route::WikiPageView.url(&["abc123"]), "/wiki/abc123");
        assert_eq!(Route::WikiPageEdit.url(&["abc123"]), "/wiki/abc123/edit");
        assert_eq!(Route::Hello.url(&["Ada", "Lovelace"]), "/howdy/Ada/Lovelace");
    }

    #[test]
    fn table_is_consistent() {
        for route in Route::ALL {
            assert_eq!(Route::from_pattern(route.pattern()), Some(route));
            assert_eq!(Route::from_name(route.name()), Some(route));
        }
    }

    #[test]
    fn wiki_permissions() {
        assert_eq!(Route::WikiView.permission(), Some(Permission::View));
        assert_eq!(Route::WikiPageView.permission(), Some(Permission::View));
        assert_eq!(Route::WikiPageAdd.permission(), Some(Permission::Edit));
        assert_eq!(Route::WikiPageEdit.permission(), Some(Permission::Edit));
        assert_eq!(Route::Hello.permission(), Some(Permission::Edit));
        assert_eq!(Route::Login.permission(), None);
        assert_eq!(Route::Logout.permission(), None);
    }
}
