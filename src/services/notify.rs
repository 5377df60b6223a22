use sqlx::PgPool;
use uuid::Uuid;

/// Fire-and-forget notification insert.
/// Spawns a background task so request handlers never block on it;
/// failures are logged, not propagated.
pub fn push(pool: PgPool, user_id: Uuid, title: &str, body: &str) {
    let title = title.to_string();
    let body = body.to_string();

    tokio::spawn(async move {
        let res = sqlx::query("INSERT INTO notifications (user_id, title, body) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(title)
            .bind(body)
            .execute(&pool)
            .await;

        if let Err(e) = res {
            tracing::warn!("notification insert failed for user {user_id}: {e}");
        }
    });
}
