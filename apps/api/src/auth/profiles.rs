use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::user::{Role, UserProfile};

pub async fn find_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Case-insensitive, matching how the auth service treats addresses.
pub async fn find_profile_by_email(pool: &PgPool, email: &str) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE lower(email) = lower($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub struct NewProfile<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub full_name: &'a str,
    pub role: Role,
    pub avatar_url: Option<&'a str>,
}

/// Inserts the public profile for a freshly created auth user.
pub async fn insert_profile(pool: &PgPool, profile: NewProfile<'_>) -> Result<UserProfile, sqlx::Error> {
    let row = sqlx::query_as::<_, UserProfile>(
        r#"
        INSERT INTO user_profiles (id, email, full_name, role, avatar_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(profile.id)
    .bind(profile.email)
    .bind(profile.full_name)
    .bind(profile.role.as_str())
    .bind(profile.avatar_url)
    .fetch_one(pool)
    .await?;

    info!("Created {} profile {}", row.role, row.id);
    Ok(row)
}

/// Generated initials avatar for a display name.
pub fn avatar_url(full_name: &str) -> Option<String> {
    reqwest::Url::parse_with_params(
        "https://ui-avatars.com/api/",
        &[("name", full_name), ("background", "random")],
    )
    .ok()
    .map(|url| url.to_string())
}
