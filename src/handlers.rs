use std::collections::HashMap;

use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::components::{NavigationComponent, views};
use crate::errors::WikiError;
use crate::forms::{FormState, Submission, WikiPageSchema};
use crate::routes::Route;
use crate::security::{Permission, RequestAuth};
use crate::services::PageRepository;
use crate::types::AppState;

/// Wrap view content in the page shell with navigation for the current user
fn render(state: &AppState, auth: &RequestAuth, title: &str, content: &str) -> Result<String, WikiError> {
    let can_edit = state.security.permits_root(auth, Permission::Edit);
    let navigation = NavigationComponent::new(auth.userid(), can_edit).build_nav_html();
    state.templates.render_page(title, &navigation, content)
}

/// 302 with optional cookie directives
fn found(location: &str, cookies: Vec<HeaderValue>) -> Response {
    let location = HeaderValue::from_str(location).unwrap_or_else(|_| HeaderValue::from_static("/"));
    let mut response = StatusCode::FOUND.into_response();
    response.headers_mut().insert(header::LOCATION, location);
    for cookie in cookies {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

/// Only same-site absolute paths are followed after login
fn safe_came_from(came_from: Option<&str>) -> String {
    match came_from {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => Route::Home.url(&[]),
    }
}

/// Handle the home page; every visit bumps the session counter
pub async fn home(
    State(state): State<AppState>,
    Extension(auth): Extension<RequestAuth>,
    headers: HeaderMap,
) -> Result<Response, WikiError> {
    debug!("Rendering home view");
    let (counter, cookie) = state.sessions.bump_counter(&headers)?;
    let content = views::home("Home View", counter, auth.userid());
    let page = render(&state, &auth, "Home View", &content)?;
    Ok(([(header::SET_COOKIE, cookie)], Html(page)).into_response())
}

/// Plain-text echo of the `name` query parameter
pub async fn plain(uri: Uri, headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let name = params.get("name").map(String::as_str).unwrap_or("No Name Provided");
    let url = match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{}{}", host, uri),
        None => uri.to_string(),
    };
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("URL {} with name: {}", url, name),
    )
}

/// Greeting for `/howdy/{first}/{last}`
pub async fn hello(
    State(state): State<AppState>,
    Extension(auth): Extension<RequestAuth>,
    Path((first, last)): Path<(String, String)>,
) -> Result<Html<String>, WikiError> {
    debug!("Hello view for {} {}", first, last);
    let page = render(&state, &auth, "Hello View", &views::hello(&first, &last))?;
    Ok(Html(page))
}

#[derive(Debug, Serialize)]
pub struct HelloJson {
    pub name: &'static str,
    pub counter: u64,
}

/// JSON flavour of the hello view; shares the session counter with home
pub async fn hello_json(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, WikiError> {
    let (counter, cookie) = state.sessions.bump_counter(&headers)?;
    let body = HelloJson { name: "Hello View", counter };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    pub came_from: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "form.submitted")]
    pub submitted: Option<String>,
}

fn render_login(
    state: &AppState,
    auth: &RequestAuth,
    message: &str,
    came_from: &str,
    login: &str,
    status: StatusCode,
) -> Result<Response, WikiError> {
    let content = views::login(&views::LoginView { message, came_from, login });
    let page = render(state, auth, "Login", &content)?;
    Ok((status, Html(page)).into_response())
}

/// Response for a request whose route permission was denied: the login form,
/// remembering where the user was headed
pub fn forbidden(state: &AppState, auth: &RequestAuth, came_from: &str) -> Response {
    render_login(state, auth, "", came_from, "", StatusCode::FORBIDDEN)
        .unwrap_or_else(|e| e.into_response())
}

/// Show the login form or process submitted credentials
pub async fn login(
    State(state): State<AppState>,
    Extension(auth): Extension<RequestAuth>,
    Form(params): Form<LoginParams>,
) -> Result<Response, WikiError> {
    let came_from = safe_came_from(params.came_from.as_deref());
    let login_value = params.login.unwrap_or_default();
    let mut message = "";

    if params.submitted.is_some() {
        let password = params.password.unwrap_or_default();
        let policy = state.security.clone();
        let username = login_value.clone();
        let accepted = tokio::task::spawn_blocking(move || policy.users().authenticate(&username, &password))
            .await
            .map_err(|e| WikiError::PasswordHash(e.to_string()))?;
        if accepted {
            info!("User '{}' logged in", login_value);
            let cookies = state.security.resolver().remember(&login_value)?;
            return Ok(found(&came_from, cookies));
        }
        warn!("Failed login for '{}'", login_value);
        message = "Failed login";
    }

    render_login(&state, &auth, message, &came_from, &login_value, StatusCode::OK)
}

/// Drop the identity ticket and go home
pub async fn logout(State(state): State<AppState>, Extension(auth): Extension<RequestAuth>) -> Response {
    if let Some(userid) = auth.userid() {
        info!("User '{}' logged out", userid);
    }
    found(&Route::Home.url(&[]), state.security.resolver().forget())
}

/// List all pages by title
pub async fn wiki_view(
    State(state): State<AppState>,
    Extension(auth): Extension<RequestAuth>,
) -> Result<Html<String>, WikiError> {
    let mut tx = state.pool.begin().await?;
    let pages = PageRepository::new(&mut tx).list().await?;
    tx.commit().await?;

    let can_edit = state.security.permits_root(&auth, Permission::Edit);
    let page = render(&state, &auth, "Wiki", &views::wiki_list(&pages, can_edit))?;
    Ok(Html(page))
}

/// Render one page; unknown uids go back to the listing
pub async fn wikipage_view(
    State(state): State<AppState>,
    Extension(auth): Extension<RequestAuth>,
    Path(uid): Path<String>,
) -> Result<Response, WikiError> {
    let mut tx = state.pool.begin().await?;
    let page = PageRepository::new(&mut tx).get(&uid).await?;
    tx.commit().await?;

    let Some(page) = page else {
        debug!("Unknown page '{}', redirecting to listing", uid);
        return Ok(found(&Route::WikiView.url(&[]), Vec::new()));
    };
    let can_edit = state.security.permits_root(&auth, Permission::Edit);
    let html = render(&state, &auth, &page.title, &views::wiki_page(&page, can_edit))?;
    Ok(Html(html).into_response())
}

/// Blank form, form with errors, or a new page followed by a redirect to it
pub async fn wikipage_add(
    State(state): State<AppState>,
    Extension(auth): Extension<RequestAuth>,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Response, WikiError> {
    let action = Route::WikiPageAdd.url(&[]);
    let form = match WikiPageSchema.process(&params) {
        Submission::Valid(input) => {
            let mut tx = state.pool.begin().await?;
            let page = PageRepository::new(&mut tx).create(&input.title, &input.body).await?;
            tx.commit().await?;
            return Ok(found(&Route::WikiPageView.url(&[page.uid.as_str()]), Vec::new()));
        }
        Submission::Invalid(form) => {
            debug!("Add page form failed validation: {:?}", form.errors);
            form
        }
        Submission::Blank => FormState::default(),
    };
    let html = render(&state, &auth, "Add WikiPage", &views::wiki_form("Add WikiPage", &action, &form))?;
    Ok(Html(html).into_response())
}

/// Prefilled form, form with errors, or an in-place update followed by a redirect
pub async fn wikipage_edit(
    State(state): State<AppState>,
    Extension(auth): Extension<RequestAuth>,
    Path(uid): Path<String>,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Response, WikiError> {
    let submission = WikiPageSchema.process(&params);

    if let Submission::Valid(input) = &submission {
        // The UPDATE must be the first statement: a deferred transaction that
        // read first cannot take the write lock after another writer commits.
        let mut tx = state.pool.begin().await?;
        let updated = PageRepository::new(&mut tx).update(&uid, &input.title, &input.body).await;
        return match updated {
            Ok(page) => {
                tx.commit().await?;
                Ok(found(&Route::WikiPageView.url(&[page.uid.as_str()]), Vec::new()))
            }
            Err(WikiError::PageNotFound(_)) => {
                debug!("Unknown page '{}' on save, redirecting to listing", uid);
                Ok(found(&Route::WikiView.url(&[]), Vec::new()))
            }
            Err(e) => Err(e),
        };
    }

    let mut tx = state.pool.begin().await?;
    let page = PageRepository::new(&mut tx).get(&uid).await?;
    tx.commit().await?;
    let Some(page) = page else {
        debug!("Unknown page '{}' on edit, redirecting to listing", uid);
        return Ok(found(&Route::WikiView.url(&[]), Vec::new()));
    };

    let form = match submission {
        Submission::Invalid(form) => {
            debug!("Edit of '{}' failed validation: {:?}", uid, form.errors);
            form
        }
        _ => FormState::prefilled(&page.title, &page.body),
    };

    let action = Route::WikiPageEdit.url(&[page.uid.as_str()]);
    let heading = format!("Edit {}", page.title);
    let html = render(&state, &auth, &heading, &views::wiki_form(&heading, &action, &form))?;
    Ok(Html(html).into_response())
}
