use log::debug;
use crate::routes::Route;
use crate::utils::{escape_attr, escape_html};

/// Component for the top navigation bar
pub struct NavigationComponent<'a> {
    userid: Option<&'a str>,
    can_edit: bool,
}

impl<'a> NavigationComponent<'a> {
    /// Create a new navigation component for the current user
    pub fn new(userid: Option<&'a str>, can_edit: bool) -> Self {
        Self { userid, can_edit }
    }

    /// Build the navigation HTML
    pub fn build_nav_html(&self) -> String {
        debug!("Building navigation for user {:?}", self.userid);
        let mut html = String::from("<nav class=\"nav\"><ul class=\"nav-list\">");
        html.push_str(&link(&Route::Home.url(&[]), "Home"));
        html.push_str(&link(&Route::WikiView.url(&[]), "Wiki"));
        if self.can_edit {
            html.push_str(&link(&Route::WikiPageAdd.url(&[]), "Add page"));
        }
        match self.userid {
            Some(userid) => {
                html.push_str(&format!(
                    "<li class=\"nav-item nav-user\">Logged in as {}</li>",
                    escape_html(userid)
                ));
                html.push_str(&link(&Route::Logout.url(&[]), "Log out"));
            }
            None => html.push_str(&link(&Route::Login.url(&[]), "Log in")),
        }
        html.push_str("</ul></nav>");
        html
    }
}

fn link(href: &str, text: &str) -> String {
    format!(
        "<li class=\"nav-item\"><a href=\"{}\">{}</a></li>",
        escape_attr(href),
        escape_html(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_sees_login() {
        let html = NavigationComponent::new(None, false).build_nav_html();
        assert!(html.contains("href=\"/login\""));
        assert!(!html.contains("/wiki/add"));
    }

    #[test]
    fn editor_sees_add_and_logout() {
        let html = NavigationComponent::new(Some("editor"), true).build_nav_html();
        assert!(html.contains("Logged in as editor"));
        assert!(html.contains("href=\"/wiki/add\""));
        assert!(html.contains("href=\"/logout\""));
    }
}
