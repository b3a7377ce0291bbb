use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::models::subscription::{SubscriptionRow, SubscriptionStatus};

pub async fn find_active(pool: &PgPool, user_id: Uuid) -> Result<Option<SubscriptionRow>, sqlx::Error> {
    sqlx::query_as::<_, SubscriptionRow>(
        r#"
        SELECT * FROM subscriptions
        WHERE user_id = $1 AND status = $2
        ORDER BY start_date DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(SubscriptionStatus::Active.as_str())
    .fetch_optional(pool)
    .await
}

/// Serializes plan changes for one user: a second switch waits here and then
/// sees the first one's committed subscription.
async fn lock_user(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM user_profiles WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(())
}

async fn cancel_active_in(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE subscriptions
        SET status = $1, end_date = now()
        WHERE user_id = $2 AND status = $3
        "#,
    )
    .bind(SubscriptionStatus::Cancelled.as_str())
    .bind(user_id)
    .bind(SubscriptionStatus::Active.as_str())
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

/// Cancels whatever is active and, unless `plan_id` is `None`, starts the new plan.
/// Both steps commit together so a user never holds two active subscriptions.
pub async fn switch_plan(
    pool: &PgPool,
    user_id: Uuid,
    plan_id: Option<&str>,
) -> Result<Option<SubscriptionRow>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    lock_user(&mut tx, user_id).await?;
    let cancelled = cancel_active_in(&mut tx, user_id).await?;

    let created = match plan_id {
        Some(plan_id) => Some(
            sqlx::query_as::<_, SubscriptionRow>(
                r#"
                INSERT INTO subscriptions (user_id, plan_id, status, start_date)
                VALUES ($1, $2, $3, now())
                RETURNING *
                "#,
            )
            .bind(user_id)
            .bind(plan_id)
            .bind(SubscriptionStatus::Active.as_str())
            .fetch_one(&mut *tx)
            .await?,
        ),
        None => None,
    };
    tx.commit().await?;

    info!(
        "User {user_id}: cancelled {cancelled} subscription(s), now on {}",
        plan_id.unwrap_or("free")
    );
    Ok(created)
}

/// Returns the number of subscriptions cancelled (0 or 1).
pub async fn cancel_active(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    lock_user(&mut tx, user_id).await?;
    let cancelled = cancel_active_in(&mut tx, user_id).await?;
    tx.commit().await?;
    Ok(cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::test_support::seed_profile;

    async fn subscriptions_of(pool: &PgPool, user_id: Uuid) -> Vec<SubscriptionRow> {
        sqlx::query_as::<_, SubscriptionRow>(
            "SELECT * FROM subscriptions WHERE user_id = $1 ORDER BY start_date",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .unwrap()
    }

    fn active_count(rows: &[SubscriptionRow]) -> usize {
        rows.iter().filter(|s| s.status == "active").count()
    }

    #[sqlx::test]
    async fn test_switch_plan_replaces_active_subscription(pool: PgPool) {
        let user = seed_profile(&pool, Role::Seeker, "ravi@example.com").await;

        switch_plan(&pool, user.id, Some("resume-pro")).await.unwrap();
        let created = switch_plan(&pool, user.id, Some("career-boost")).await.unwrap().unwrap();
        assert_eq!(created.plan_id, "career-boost");

        let rows = subscriptions_of(&pool, user.id).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(active_count(&rows), 1);
        assert_eq!(rows[0].status, "cancelled");
        assert!(rows[0].end_date.is_some());
        assert_eq!(find_active(&pool, user.id).await.unwrap().map(|s| s.id), Some(created.id));
    }

    #[sqlx::test]
    async fn test_switch_to_free_only_cancels(pool: PgPool) {
        let user = seed_profile(&pool, Role::Seeker, "ravi@example.com").await;
        switch_plan(&pool, user.id, Some("resume-pro")).await.unwrap();

        assert!(switch_plan(&pool, user.id, None).await.unwrap().is_none());
        assert!(find_active(&pool, user.id).await.unwrap().is_none());
        assert_eq!(subscriptions_of(&pool, user.id).await.len(), 1);
    }

    #[sqlx::test]
    async fn test_cancel_active_counts_cancelled_rows(pool: PgPool) {
        let user = seed_profile(&pool, Role::Employer, "hr@acme.test").await;
        assert_eq!(cancel_active(&pool, user.id).await.unwrap(), 0);

        switch_plan(&pool, user.id, Some("employer-pro")).await.unwrap();
        assert_eq!(cancel_active(&pool, user.id).await.unwrap(), 1);
        assert_eq!(cancel_active(&pool, user.id).await.unwrap(), 0);
    }

    #[sqlx::test]
    async fn test_concurrent_switches_leave_one_active(pool: PgPool) {
        let user = seed_profile(&pool, Role::Seeker, "ravi@example.com").await;

        for _ in 0..5 {
            let (a, b) = tokio::join!(
                switch_plan(&pool, user.id, Some("resume-pro")),
                switch_plan(&pool, user.id, Some("career-boost")),
            );
            assert!(a.is_ok() && b.is_ok());
            assert_eq!(active_count(&subscriptions_of(&pool, user.id).await), 1);
        }
    }
}
