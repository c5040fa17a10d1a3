use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    context::RequestContext,
    error::{AppResult, OptionExt},
    forms::Form,
    routes::render,
    session::{SessionState, FLASH},
    state::AppState,
    templates::{Page, TemplateData},
};

pub const EXPIRY_OPTIONS: [&str; 3] = ["365", "7", "1"];

pub async fn home(
    State(state): State<AppState>,
    ctx: RequestContext,
    session: SessionState,
) -> AppResult<Html<String>> {
    let snippets = state.snippets.latest().await?;
    render(&ctx, &session, Page::Home, TemplateData { snippets, ..Default::default() }).await
}

pub async fn show_snippet(
    State(state): State<AppState>,
    ctx: RequestContext,
    session: SessionState,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_id(&id).ok_or_not_found("snippet")?;
    let snippet = state.snippets.get(id).await?;
    render(&ctx, &session, Page::ShowSnippet, TemplateData { snippet: Some(snippet), ..Default::default() })
        .await
}

pub async fn create_snippet_form(ctx: RequestContext, session: SessionState) -> AppResult<Html<String>> {
    render(&ctx, &session, Page::CreateSnippet, TemplateData::with_form(Form::default())).await
}

pub async fn create_snippet(
    State(state): State<AppState>,
    ctx: RequestContext,
    session: SessionState,
    mut form: Form,
) -> AppResult<Response> {
    form.required(&["title", "content", "expires"]);
    form.max_length("title", 100);
    form.permitted_values("expires", &EXPIRY_OPTIONS);

    if !form.valid() {
        let page = render(&ctx, &session, Page::CreateSnippet, TemplateData::with_form(form)).await?;
        return Ok(page.into_response());
    }

    // permitted_values guarantees a small positive integer here
    let days: i64 = form.get("expires").parse().unwrap_or(365);
    let id = state.snippets.insert(form.get("title"), form.get("content"), days).await?;
    tracing::info!(snippet_id = id, "Snippet created");

    session.put(FLASH, "Snippet successfully created!").await?;
    Ok(Redirect::to(&format!("/snippet/{}", id)).into_response())
}

/// Snippet ids are positive integers; anything else is treated as not found.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("1"), Some(1));
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id(""), None);
    }
}
