//! Defines the route handlers for reminders.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rusqlite::params;

use crate::{
    Error,
    db::lock_connection,
    extract::ApiJson,
    reminder::core::{
        Reminder, ReminderForm, ReminderId, ReminderState, create_reminder, get_reminder,
        get_reminders, update_reminder,
    },
};

/// A route handler for listing all reminders ordered by date.
pub async fn list_reminders_endpoint(
    State(state): State<ReminderState>,
) -> Result<Json<Vec<Reminder>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_reminders(false, &connection).map(Json)
}

/// A route handler for listing the reminders that are not done, ordered by date.
pub async fn list_pending_reminders_endpoint(
    State(state): State<ReminderState>,
) -> Result<Json<Vec<Reminder>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_reminders(true, &connection).map(Json)
}

pub async fn get_reminder_endpoint(
    State(state): State<ReminderState>,
    Path(reminder_id): Path<ReminderId>,
) -> Result<Json<Reminder>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_reminder(reminder_id, &connection).map(Json)
}

pub async fn create_reminder_endpoint(
    State(state): State<ReminderState>,
    ApiJson(form): ApiJson<ReminderForm>,
) -> Result<(StatusCode, Json<Reminder>), Error> {
    form.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let reminder = create_reminder(&form, &connection)?;

    Ok((StatusCode::CREATED, Json(reminder)))
}

pub async fn edit_reminder_endpoint(
    State(state): State<ReminderState>,
    Path(reminder_id): Path<ReminderId>,
    ApiJson(form): ApiJson<ReminderForm>,
) -> Result<Json<Reminder>, Error> {
    form.validate()?;

    let connection = lock_connection(&state.db_connection)?;

    match update_reminder(reminder_id, &form, &connection)? {
        0 => Err(Error::NotFound),
        _ => Ok(Json(get_reminder(reminder_id, &connection)?)),
    }
}

pub async fn delete_reminder_endpoint(
    State(state): State<ReminderState>,
    Path(reminder_id): Path<ReminderId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match connection.execute("DELETE FROM reminder WHERE id = ?1", params![reminder_id])? {
        0 => Err(Error::NotFound),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}
