//! HTML pages.
//!
//! Every page is wrapped in the same layout and receives a [`TemplateData`]. All
//! interpolated text goes through [`escape`].

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::forms::Form;
use crate::models::Snippet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    ShowSnippet,
    CreateSnippet,
    Signup,
    Login,
}

/// Dynamic data for a page; the common fields are filled in by `routes::render`.
#[derive(Debug, Default)]
pub struct TemplateData {
    pub current_year: i32,
    pub flash: String,
    pub is_authenticated: bool,
    pub csrf_token: String,
    pub form: Option<Form>,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
}

impl TemplateData {
    pub fn with_form(form: Form) -> Self {
        Self { form: Some(form), ..Default::default() }
    }
}

/// `17 Dec 2020 at 10:00`
pub fn human_date(t: DateTime<Utc>) -> String {
    t.format("%d %b %Y at %H:%M").to_string()
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(page: Page, td: &TemplateData) -> String {
    let (title, body) = match page {
        Page::Home => ("Home", home(td)),
        Page::ShowSnippet => ("Snippet", show_snippet(td)),
        Page::CreateSnippet => ("Create a New Snippet", create_snippet(td)),
        Page::Signup => ("Signup", signup(td)),
        Page::Login => ("Login", login(td)),
    };
    layout(title, &body, td)
}

fn layout(title: &str, body: &str, td: &TemplateData) -> String {
    let mut nav = String::from(r#"<div><a href="/">Home</a>"#);
    if td.is_authenticated {
        nav.push_str(r#"<a href="/snippet/create">Create snippet</a>"#);
    }
    nav.push_str("</div><div>");
    if td.is_authenticated {
        let _ = write!(
            nav,
            r#"<form action="/user/logout" method="POST">{}<button>Logout</button></form>"#,
            csrf_field(td)
        );
    } else {
        nav.push_str(r#"<a href="/user/signup">Signup</a><a href="/user/login">Login</a>"#);
    }
    nav.push_str("</div>");

    let flash = if td.flash.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="flash">{}</div>"#, escape(&td.flash))
    };

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - Snipbox</title>
<link rel="stylesheet" href="/static/css/main.css">
</head>
<body>
<header><h1><a href="/">Snipbox</a></h1></header>
<nav>{nav}</nav>
<main>
{flash}
{body}
</main>
<footer>Powered by Rust in {year}</footer>
</body>
</html>
"#,
        title = escape(title),
        nav = nav,
        flash = flash,
        body = body,
        year = td.current_year,
    )
}

fn csrf_field(td: &TemplateData) -> String {
    format!(r#"<input type="hidden" name="csrf_token" value="{}">"#, escape(&td.csrf_token))
}

fn field_errors(form: &Form, field: &str) -> String {
    form.errors
        .all(field)
        .iter()
        .map(|msg| format!(r#"<label class="error">{}</label>"#, escape(msg)))
        .collect()
}

fn home(td: &TemplateData) -> String {
    if td.snippets.is_empty() {
        return "<h2>Latest Snippets</h2>\n<p>There's nothing to see here... yet!</p>".to_string();
    }
    let mut rows = String::new();
    for s in &td.snippets {
        let _ = write!(
            rows,
            r#"<tr><td><a href="/snippet/{id}">{title}</a></td><td>{created}</td><td>#{id}</td></tr>"#,
            id = s.id,
            title = escape(&s.title),
            created = human_date(s.created),
        );
    }
    format!(
        "<h2>Latest Snippets</h2>\n<table>\n<tr><th>Title</th><th>Created</th><th>ID</th></tr>\n{}\n</table>",
        rows
    )
}

fn show_snippet(td: &TemplateData) -> String {
    let Some(s) = &td.snippet else {
        return String::new();
    };
    format!(
        r#"<div class="snippet">
<div class="metadata"><strong>{title}</strong><span>#{id}</span></div>
<pre><code>{content}</code></pre>
<div class="metadata"><time>Created: {created}</time><time>Expires: {expires}</time></div>
</div>"#,
        title = escape(&s.title),
        id = s.id,
        content = escape(&s.content),
        created = human_date(s.created),
        expires = human_date(s.expires),
    )
}

fn create_snippet(td: &TemplateData) -> String {
    let empty = Form::default();
    let form = td.form.as_ref().unwrap_or(&empty);
    let expires = match form.get("expires") {
        "" => "365",
        v => v,
    };
    let mut radios = String::new();
    for (value, label) in [("365", "One Year"), ("7", "One Week"), ("1", "One Day")] {
        let checked = if expires == value { " checked" } else { "" };
        let _ = write!(
            radios,
            r#"<input type="radio" name="expires" value="{value}"{checked}> {label} "#,
        );
    }
    format!(
        r#"<form action="/snippet/create" method="POST">
{csrf}
<div>
<label>Title:</label>
{title_err}
<input type="text" name="title" value="{title}">
</div>
<div>
<label>Content:</label>
{content_err}
<textarea name="content">{content}</textarea>
</div>
<div>
<label>Delete in:</label>
{expires_err}
{radios}
</div>
<div><input type="submit" value="Publish snippet"></div>
</form>"#,
        csrf = csrf_field(td),
        title_err = field_errors(form, "title"),
        title = escape(form.get("title")),
        content_err = field_errors(form, "content"),
        content = escape(form.get("content")),
        expires_err = field_errors(form, "expires"),
        radios = radios,
    )
}

fn signup(td: &TemplateData) -> String {
    let empty = Form::default();
    let form = td.form.as_ref().unwrap_or(&empty);
    format!(
        r#"<form action="/user/signup" method="POST" novalidate>
{csrf}
<div>
<label>Name:</label>
{name_err}
<input type="text" name="name" value="{name}">
</div>
<div>
<label>Email:</label>
{email_err}
<input type="email" name="email" value="{email}">
</div>
<div>
<label>Password:</label>
{password_err}
<input type="password" name="password">
</div>
<div><input type="submit" value="Signup"></div>
</form>"#,
        csrf = csrf_field(td),
        name_err = field_errors(form, "name"),
        name = escape(form.get("name")),
        email_err = field_errors(form, "email"),
        email = escape(form.get("email")),
        password_err = field_errors(form, "password"),
    )
}

fn login(td: &TemplateData) -> String {
    let empty = Form::default();
    let form = td.form.as_ref().unwrap_or(&empty);
    let generic = form
        .errors
        .get("generic")
        .map(|msg| format!(r#"<div class="error">{}</div>"#, escape(msg)))
        .unwrap_or_default();
    format!(
        r#"<form action="/user/login" method="POST" novalidate>
{csrf}
{generic}
<div>
<label>Email:</label>
<input type="email" name="email" value="{email}">
</div>
<div>
<label>Password:</label>
<input type="password" name="password">
</div>
<div><input type="submit" value="Login"></div>
</form>"#,
        csrf = csrf_field(td),
        generic = generic,
        email = escape(form.get("email")),
    )
}
