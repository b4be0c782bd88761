//! Content fragments for each view; the shell is added by `TemplateComponent`.

use crate::forms::{FormState, SUBMIT_MARKER, WikiPageSchema};
use crate::routes::Route;
use crate::types::Page;
use crate::utils::{escape_attr, escape_html};

pub fn home(name: &str, counter: u64, logged_in: Option<&str>) -> String {
    let greeting = match logged_in {
        Some(userid) => format!("<p class=\"user\">Welcome back, {}.</p>", escape_html(userid)),
        None => "<p class=\"user\">You are not logged in.</p>".to_string(),
    };
    format!(
        "<h1>{}</h1><p class=\"counter\">Counter: {}</p>{}",
        escape_html(name),
        counter,
        greeting
    )
}

pub fn hello(first: &str, last: &str) -> String {
    format!(
        "<h1>Hello View</h1><p class=\"greeting\">Howdy, {} {}!</p>",
        escape_html(first),
        escape_html(last)
    )
}

/// Values shown on the login form
pub struct LoginView<'a> {
    pub message: &'a str,
    pub came_from: &'a str,
    pub login: &'a str,
}

pub fn login(view: &LoginView<'_>) -> String {
    let mut html = String::from("<h1>Login</h1>");
    if !view.message.is_empty() {
        html.push_str(&format!("<p class=\"message\">{}</p>", escape_html(view.message)));
    }
    html.push_str(&format!(
        "<form action=\"{}\" method=\"post\">\
         <input type=\"hidden\" name=\"came_from\" value=\"{}\">\
         <label for=\"login\">Username</label>\
         <input type=\"text\" id=\"login\" name=\"login\" value=\"{}\">\
         <label for=\"password\">Password</label>\
         <input type=\"password\" id=\"password\" name=\"password\" value=\"\">\
         <input type=\"submit\" name=\"form.submitted\" value=\"Log In\">\
         </form>",
        escape_attr(&Route::Login.url(&[])),
        escape_attr(view.came_from),
        escape_attr(view.login)
    ));
    html
}

pub fn wiki_list(pages: &[Page], can_edit: bool) -> String {
    let mut html = String::from("<h1>Wiki</h1>");
    if pages.is_empty() {
        html.push_str("<p class=\"empty\">No pages yet.</p>");
    } else {
        html.push_str("<ul class=\"listing\">");
        for page in pages {
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>",
                escape_attr(&Route::WikiPageView.url(&[page.uid.as_str()])),
                escape_html(&page.title)
            ));
        }
        html.push_str("</ul>");
    }
    if can_edit {
        html.push_str(&format!(
            "<p><a class=\"button\" href=\"{}\">Add WikiPage</a></p>",
            escape_attr(&Route::WikiPageAdd.url(&[]))
        ));
    }
    html
}

/// A single page; the stored body is HTML and is emitted unescaped.
pub fn wiki_page(page: &Page, can_edit: bool) -> String {
    let mut html = format!(
        "<h1>{}</h1><div class=\"page-body\">{}</div>",
        escape_html(&page.title),
        page.body
    );
    if can_edit {
        html.push_str(&format!(
            "<p><a class=\"button\" href=\"{}\">Edit</a></p>",
            escape_attr(&Route::WikiPageEdit.url(&[page.uid.as_str()]))
        ));
    }
    html.push_str(&format!(
        "<p><a href=\"{}\">Back to the wiki</a></p>",
        escape_attr(&Route::WikiView.url(&[]))
    ));
    html
}

pub fn wiki_form(heading: &str, action: &str, state: &FormState) -> String {
    let mut html = format!("<h1>{}</h1>", escape_html(heading));
    if state.has_errors() {
        html.push_str("<p class=\"form-error\">There was a problem with your submission</p>");
    }
    html.push_str(&format!("<form action=\"{}\" method=\"post\">", escape_attr(action)));
    for field in WikiPageSchema::FIELDS {
        let label = match field {
            "title" => "Title",
            _ => "Body",
        };
        let class = if state.error(field).is_some() { "field error" } else { "field" };
        html.push_str(&format!("<div class=\"{}\"><label for=\"{}\">{}</label>", class, field, label));
        if field == "body" {
            html.push_str(&format!(
                "<textarea id=\"body\" name=\"body\" class=\"richtext\" rows=\"12\">{}</textarea>",
                escape_html(state.value(field))
            ));
        } else {
            html.push_str(&format!(
                "<input type=\"text\" id=\"{}\" name=\"{}\" value=\"{}\">",
                field,
                field,
                escape_attr(state.value(field))
            ));
        }
        if let Some(message) = state.error(field) {
            html.push_str(&format!("<p class=\"error-msg\">{}</p>", escape_html(message)));
        }
        html.push_str("</div>");
    }
    html.push_str(&format!(
        "<button type=\"submit\" name=\"{0}\" value=\"{0}\">Submit</button></form>",
        SUBMIT_MARKER
    ));
    html
}
