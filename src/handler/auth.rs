use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use chrono::Utc;
use validator::Validate;

use super::json_body;
use crate::{
    dtos::{
        userdtos::{AuthDataDto, FilterUserDto, LoginDto, MeDto, SignupDto, UserLoginResponseDto},
        validation_message, ApiResponse,
    },
    error::{ErrorMessage, HttpError},
    middleware::{auth, JWTAuthMiddleware},
    models::usermodel::{NewUser, UserRole},
    utils::{password, token},
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(get_me).layer(middleware::from_fn(auth)))
}

pub async fn signup(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<SignupDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(validation_message(&e)))?;

    let (Some(phone), Some(name), Some(raw_password), Some(role)) =
        (body.phone, body.name, body.password, body.role)
    else {
        return Err(HttpError::bad_request("Phone, name, password and role are required"));
    };
    let email = body.email.filter(|e| !e.trim().is_empty());

    let existing = app_state.db_client.get_user(None, Some(&phone), None).await?;
    if existing.is_some() {
        return Err(HttpError::bad_request(ErrorMessage::UserAlreadyExists.to_string()));
    }
    if let Some(email) = &email {
        let existing = app_state.db_client.get_user(None, None, Some(email)).await?;
        if existing.is_some() {
            return Err(HttpError::bad_request(ErrorMessage::UserAlreadyExists.to_string()));
        }
    }

    let hashed_password = password::hash(raw_password).map_err(|e| match e {
        ErrorMessage::ExceededMaxPasswordLength(_) => HttpError::bad_request(e.to_string()),
        _ => HttpError::server_error(e.to_string()),
    })?;

    let user = app_state
        .db_client
        .save_user(NewUser {
            name,
            phone,
            email,
            password: hashed_password,
            role,
            profile_image: body.profile_image,
            whatsapp_number: body.whatsapp_number,
            accepted_terms_at: body.accepted_terms.filter(|accepted| *accepted).map(|_| Utc::now()),
            location: body.location.unwrap_or_default(),
            latitude: body.latitude,
            longitude: body.longitude,
        })
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                HttpError::bad_request(ErrorMessage::UserAlreadyExists.to_string())
            } else {
                HttpError::from(e)
            }
        })?;

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::info!(user_id = %user.id, role = user.role.to_str(), "user registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "User registered successfully",
            AuthDataDto {
                user: FilterUserDto::filter_user(&user),
                token,
            },
        )),
    ))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<LoginDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(body)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(validation_message(&e)))?;

    let user = app_state
        .db_client
        .get_user(None, Some(&body.phone), None)
        .await?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matched = password::compare(&body.password, &user.password)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        tracing::debug!(user_id = %user.id, "login rejected");
        return Err(HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string()));
    }

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie_duration = time::Duration::minutes(app_state.env.jwt_maxage);
    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(cookie_duration)
        .http_only(true)
        .build();
    let cookie_header = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        token,
        user: FilterUserDto::filter_user(&user),
    })
    .into_response();
    response.headers_mut().append(header::SET_COOKIE, cookie_header);

    Ok(response)
}

pub async fn get_me(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let user = auth.user;

    let (worker_profile, farmer_profile) = match user.role {
        UserRole::Worker => (app_state.db_client.get_worker_profile(user.id).await?, None),
        UserRole::Farmer => (None, app_state.db_client.get_farmer_profile(user.id).await?),
    };

    Ok(Json(ApiResponse::success(
        "User retrieved successfully",
        MeDto {
            user: FilterUserDto::filter_user(&user),
            worker_profile,
            farmer_profile,
        },
    )))
}
