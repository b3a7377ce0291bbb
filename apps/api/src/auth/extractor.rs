use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::auth::client::AuthError;
use crate::auth::profiles::find_profile;
use crate::errors::AppError;
use crate::models::user::{Role, UserProfile};
use crate::state::AppState;

/// The signed-in caller, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub profile: UserProfile,
    pub access_token: String,
}

impl CurrentUser {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role()) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;

        let user = match state.auth.get_user(token).await {
            Ok(user) => user,
            Err(AuthError::Rejected { .. }) => return Err(AppError::Unauthorized),
            Err(e) => return Err(e.into()),
        };

        let profile = find_profile(&state.db, user.id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser {
            profile,
            access_token: token.to_string(),
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use uuid::Uuid;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    fn user_with_role(role: Role) -> CurrentUser {
        CurrentUser {
            profile: UserProfile {
                id: Uuid::new_v4(),
                email: "priya@example.com".into(),
                full_name: "Priya Singh".into(),
                role: role.as_str().into(),
                avatar_url: None,
                created_at: Utc::now(),
            },
            access_token: "token".into(),
        }
    }

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer   xyz ")), Some("xyz"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_require_role() {
        let employer = user_with_role(Role::Employer);
        assert!(employer.require_role(&[Role::Employer, Role::Admin]).is_ok());
        assert!(matches!(
            employer.require_role(&[Role::Seeker]),
            Err(AppError::Forbidden)
        ));
        assert!(user_with_role(Role::Admin).is_admin());
    }
}
