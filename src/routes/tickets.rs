use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::{
        auth::ActiveUser,
        ticket::{CreateTicketRequest, SupportTicket, TicketStatus, UpdateTicketStatusRequest},
    },
    services::notify,
    AppState,
};

use super::{db_error, fail, is_staff, require_staff, ApiError};

const TICKET_COLUMNS: &str = "id, user_id, subject, message, status, created_at, updated_at";

pub async fn create_ticket(
    State(state): State<AppState>,
    user: ActiveUser,
    Json(body): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(subject), Some(message)) = (
        body.subject.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        body.message.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    ) else {
        return Err(fail(StatusCode::BAD_REQUEST, "Asunto y mensaje son requeridos"));
    };

    let ticket: SupportTicket = sqlx::query_as(&format!(
        "INSERT INTO support_tickets (user_id, subject, message)
         VALUES ($1, $2, $3)
         RETURNING {TICKET_COLUMNS}"
    ))
    .bind(user.auth.user_id)
    .bind(subject)
    .bind(message)
    .fetch_one(&state.db)
    .await
    .map_err(db_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Ticket de soporte creado exitosamente",
            "data": { "ticket": ticket },
        })),
    ))
}

/// Users see their own tickets; support and admin see the whole queue.
pub async fn list_tickets(
    State(state): State<AppState>,
    user: ActiveUser,
) -> Result<Json<Value>, ApiError> {
    let tickets: Vec<SupportTicket> = if is_staff(&user.auth) {
        sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets ORDER BY created_at DESC"
        ))
        .fetch_all(&state.db)
        .await
        .map_err(db_error)?
    } else {
        sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user.auth.user_id)
        .fetch_all(&state.db)
        .await
        .map_err(db_error)?
    };

    Ok(Json(json!({
        "status": "success",
        "results": tickets.len(),
        "data": { "tickets": tickets },
    })))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let ticket: Option<SupportTicket> =
        sqlx::query_as(&format!("SELECT {TICKET_COLUMNS} FROM support_tickets WHERE id = $1"))
            .bind(id)
            .fetch_optional(&state.db)
            .await
            .map_err(db_error)?;

    let Some(ticket) = ticket else {
        return Err(fail(StatusCode::NOT_FOUND, "Ticket no encontrado"));
    };
    if ticket.user_id != user.auth.user_id && !is_staff(&user.auth) {
        return Err(fail(StatusCode::FORBIDDEN, "Acceso denegado"));
    }

    Ok(Json(json!({
        "status": "success",
        "data": { "ticket": ticket },
    })))
}

pub async fn update_status(
    State(state): State<AppState>,
    user: ActiveUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTicketStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    require_staff(&user.auth)?;

    let Some(raw) = body.status.as_deref() else {
        return Err(fail(StatusCode::BAD_REQUEST, "El estado es requerido"));
    };
    let status: TicketStatus = raw
        .parse()
        .map_err(|_| fail(StatusCode::BAD_REQUEST, "Estado inválido"))?;

    let owner: Option<Uuid> = sqlx::query_scalar(
        "UPDATE support_tickets SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING user_id",
    )
    .bind(id)
    .bind(status.to_string())
    .fetch_optional(&state.db)
    .await
    .map_err(db_error)?;

    let Some(owner) = owner else {
        return Err(fail(StatusCode::NOT_FOUND, "Ticket no encontrado"));
    };

    notify::push(
        state.db.clone(),
        owner,
        "Ticket de soporte actualizado",
        &format!("Tu ticket ahora está {status}"),
    );

    Ok(Json(json!({
        "status": "success",
        "message": "Estado del ticket actualizado",
    })))
}
