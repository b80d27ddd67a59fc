//! Defines the route handlers for registering and managing users.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rusqlite::params;
use serde::Deserialize;

use crate::{
    Error, PasswordHash, ValidatedPassword,
    db::lock_connection,
    extract::ApiJson,
    user::core::{
        User, UserId, UserState, create_user, get_user, get_users, map_duplicate_email,
        update_password, validate_profile,
    },
};

/// The request body for registering a user.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

/// The request body for updating a user's profile.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileForm {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}

/// The request body for changing a user's password.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordForm {
    #[serde(rename = "senha_atual")]
    pub current_password: String,
    #[serde(rename = "nova_senha")]
    pub new_password: String,
}

pub async fn list_users_endpoint(State(state): State<UserState>) -> Result<Json<Vec<User>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_users(&connection).map(Json)
}

pub async fn get_user_endpoint(
    State(state): State<UserState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_user(user_id, &connection).map(Json)
}

/// A route handler for registering a user, responds with the new user.
///
/// The password must be hard to guess. Only its bcrypt hash is stored.
pub async fn create_user_endpoint(
    State(state): State<UserState>,
    ApiJson(form): ApiJson<RegisterForm>,
) -> Result<(StatusCode, Json<User>), Error> {
    let (name, email) = validate_profile(&form.name, &form.email)?;
    let password = ValidatedPassword::new(&form.password, &[name, email.as_str()])?;
    let password_hash = PasswordHash::new(password, state.password_hash_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(name, &email, password_hash, &connection)?;

    tracing::info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn edit_user_endpoint(
    State(state): State<UserState>,
    Path(user_id): Path<UserId>,
    ApiJson(form): ApiJson<ProfileForm>,
) -> Result<Json<User>, Error> {
    let (name, email) = validate_profile(&form.name, &form.email)?;

    let connection = lock_connection(&state.db_connection)?;
    let rows_affected = connection
        .execute(
            "UPDATE user SET name = ?1, email = ?2 WHERE id = ?3",
            params![name, email, user_id],
        )
        .map_err(map_duplicate_email(&email))?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(Json(get_user(user_id, &connection)?)),
    }
}

pub async fn delete_user_endpoint(
    State(state): State<UserState>,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match connection.execute("DELETE FROM user WHERE id = ?1", params![user_id])? {
        0 => Err(Error::NotFound),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

/// A route handler for changing a user's password, responds with 204 No Content.
///
/// The current password must match the stored hash and the new password
/// must pass the strength check.
pub async fn change_password_endpoint(
    State(state): State<UserState>,
    Path(user_id): Path<UserId>,
    ApiJson(form): ApiJson<ChangePasswordForm>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_user(user_id, &connection)?;

    let current_hash = user.password_hash.as_ref().ok_or(Error::IncorrectPassword)?;
    if !current_hash.verify(&form.current_password)? {
        return Err(Error::IncorrectPassword);
    }

    let password = ValidatedPassword::new(
        &form.new_password,
        &[user.name.as_str(), user.email.as_str()],
    )?;
    let password_hash = PasswordHash::new(password, state.password_hash_cost)?;
    update_password(user_id, &password_hash, &connection)?;

    tracing::info!("Changed the password of user {user_id}");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::must_create_test_server,
        user::User,
    };

    const PASSWORD: &str = "pao-de-queijo-quentinho-42";

    async fn register(server: &axum_test::TestServer, email: &str) -> axum_test::TestResponse {
        server
            .post(endpoints::USERS)
            .json(&json!({ "nome": "Ana Souza", "email": email, "senha": PASSWORD }))
            .await
    }

    #[tokio::test]
    async fn register_does_not_expose_password() {
        let server = must_create_test_server();

        let response = register(&server, "ana@example.com").await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["nome"], "Ana Souza");
        assert_eq!(body["email"], "ana@example.com");
        assert!(body.get("senha").is_none());
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_bad_request() {
        let server = must_create_test_server();
        register(&server, "ana@example.com").await.assert_status(StatusCode::CREATED);

        register(&server, "ana@example.com")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn weak_password_is_bad_request() {
        let server = must_create_test_server();

        server
            .post(endpoints::USERS)
            .json(&json!({ "nome": "Ana", "email": "ana@example.com", "senha": "123456" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn change_password_checks_current_password() {
        let server = must_create_test_server();
        let user = register(&server, "ana@example.com").await.json::<User>();
        let path = format_endpoint(endpoints::USER_PASSWORD, user.id);

        server
            .put(&path)
            .json(&json!({ "senha_atual": "errada", "nova_senha": "goiabada-com-queijo-minas-7" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .put(&path)
            .json(&json!({ "senha_atual": PASSWORD, "nova_senha": "goiabada-com-queijo-minas-7" }))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn update_profile_and_delete() {
        let server = must_create_test_server();
        let user = register(&server, "ana@example.com").await.json::<User>();
        let path = format_endpoint(endpoints::USER, user.id);

        let updated = server
            .put(&path)
            .json(&json!({ "nome": "Ana S.", "email": "ana.souza@example.com" }))
            .await
            .json::<User>();
        assert_eq!(updated.name, "Ana S.");
        assert_eq!(updated.email, "ana.souza@example.com");

        server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
        server.get(&path).await.assert_status_not_found();
    }
}
