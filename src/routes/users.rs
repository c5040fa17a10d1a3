use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    context::RequestContext,
    error::AppResult,
    forms::{Form, EMAIL_RX},
    middleware::auth::LOGIN_PATH,
    models::ModelError,
    routes::render,
    session::{SessionState, AUTHENTICATED_USER_ID, FLASH},
    state::AppState,
    templates::{Page, TemplateData},
};

pub const INVALID_CREDENTIALS: &str = "Email or Password is incorrect, or the account is inactive";
pub const DUPLICATE_EMAIL: &str = "Address is already in use";

pub async fn signup_form(ctx: RequestContext, session: SessionState) -> AppResult<Html<String>> {
    render(&ctx, &session, Page::Signup, TemplateData::with_form(Form::default())).await
}

pub async fn signup(
    State(state): State<AppState>,
    ctx: RequestContext,
    session: SessionState,
    mut form: Form,
) -> AppResult<Response> {
    form.required(&["name", "email", "password"]);
    form.max_length("name", 255);
    form.max_length("email", 255);
    form.matches_pattern("email", &EMAIL_RX);
    form.min_length("password", 10);

    if form.valid() {
        match state.users.insert(form.get("name"), form.get("email"), form.get("password")).await {
            Ok(()) => {
                tracing::info!("New user signed up");
                session.put(FLASH, "Your signup was successful. Please log in.").await?;
                return Ok(Redirect::to(LOGIN_PATH).into_response());
            }
            Err(ModelError::DuplicateEmail) => form.errors.add("email", DUPLICATE_EMAIL),
            Err(e) => return Err(e.into()),
        }
    }

    let page = render(&ctx, &session, Page::Signup, TemplateData::with_form(form)).await?;
    Ok(page.into_response())
}

pub async fn login_form(ctx: RequestContext, session: SessionState) -> AppResult<Html<String>> {
    render(&ctx, &session, Page::Login, TemplateData::with_form(Form::default())).await
}

pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    session: SessionState,
    mut form: Form,
) -> AppResult<Response> {
    match state.users.authenticate(form.get("email"), form.get("password")).await {
        Ok(user_id) => {
            // New session id on privilege change to defeat session fixation.
            session.renew().await?;
            session.put(AUTHENTICATED_USER_ID, user_id).await?;
            tracing::info!(user_id, "User logged in");
            Ok(Redirect::to("/snippet/create").into_response())
        }
        Err(ModelError::InvalidCredentials) => {
            form.errors.add("generic", INVALID_CREDENTIALS);
            let page = render(&ctx, &session, Page::Login, TemplateData::with_form(form)).await?;
            Ok(page.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(ctx: RequestContext, session: SessionState) -> AppResult<Redirect> {
    session.remove(AUTHENTICATED_USER_ID).await?;
    session.put(FLASH, "You've been logged out successfully!").await?;
    tracing::info!(user_id = ?ctx.user_id(), "User logged out");
    Ok(Redirect::to("/"))
}
