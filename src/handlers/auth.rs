use axum::{Form, Json};

use crate::{
    error::AppError,
    models::{LoginForm, Token},
};

/// Stub login endpoint; a real credential check lives outside this service.
pub async fn login(Form(form): Form<LoginForm>) -> Result<Json<Token>, AppError> {
    if form.username == "admin" && form.password == "admin" {
        return Ok(Json(Token {
            access_token: "fake-admin-token".to_string(),
            token_type: "bearer".to_string(),
        }));
    }

    Err(AppError::Validation(
        "Incorrect email or password".to_string(),
    ))
}
