use axum::http::{HeaderMap, HeaderValue, header};
use std::time::Duration;

use crate::errors::WikiError;

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape HTML attribute values
pub fn escape_attr(text: &str) -> String {
    escape_html(text)
}

/// Read a cookie from the request headers; later `Cookie` headers are searched too
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for cookie in headers.get_all(header::COOKIE) {
        let Ok(s) = cookie.to_str() else { continue };
        for part in s.split(';') {
            if let Some((k, v)) = part.trim().split_once('=') {
                if k == name {
                    return Some(v.trim_matches('"').to_string());
                }
            }
        }
    }
    None
}

/// Build a `Set-Cookie` value scoped to the whole site
pub fn set_cookie(name: &str, value: &str, max_age: Option<Duration>) -> Result<HeaderValue, WikiError> {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value);
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", max_age.as_secs()));
    }
    HeaderValue::from_str(&cookie).map_err(|e| WikiError::Signing(e.to_string()))
}

/// Build a `Set-Cookie` value that removes a cookie
pub fn clear_cookie(name: &str) -> HeaderValue {
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        name
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("deleted=; Max-Age=0"))
}
