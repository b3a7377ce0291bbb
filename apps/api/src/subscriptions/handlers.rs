//! Axum route handlers for plans and subscriptions.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::subscription::SubscriptionRow;
use crate::models::user::Role;
use crate::state::AppState;
use crate::subscriptions::plans::{find_plan, plans_for, PricingPlan, DEFAULT_PLAN_ID};
use crate::subscriptions::repo::{cancel_active, find_active, switch_plan};

#[derive(Debug, Default, Deserialize)]
pub struct PlansQuery {
    pub target: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    pub plan_id: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentPlanResponse {
    pub plan_id: String,
    pub plan: Option<&'static PricingPlan>,
    /// `None` while on the default free plan.
    pub subscription: Option<SubscriptionRow>,
}

impl CurrentPlanResponse {
    fn from_subscription(subscription: Option<SubscriptionRow>) -> Self {
        let plan_id = subscription
            .as_ref()
            .map(|s| s.plan_id.clone())
            .unwrap_or_else(|| DEFAULT_PLAN_ID.to_string());
        Self {
            plan: find_plan(&plan_id),
            plan_id,
            subscription,
        }
    }
}

/// Checks a plan change before any write.
fn validate_upgrade(
    role: Role,
    current_plan_id: &str,
    requested: &str,
) -> Result<&'static PricingPlan, AppError> {
    let plan = find_plan(requested)
        .ok_or_else(|| AppError::NotFound(format!("Plan '{requested}' not found")))?;
    if plan.target != role {
        return Err(AppError::UnprocessableEntity(format!(
            "plan '{}' is for {} accounts",
            plan.id, plan.target
        )));
    }
    if plan.id == current_plan_id {
        return Err(AppError::Conflict(format!("Already on the {} plan", plan.name)));
    }
    Ok(plan)
}

/// GET /api/v1/plans?target=SEEKER
pub async fn handle_list_plans(Query(query): Query<PlansQuery>) -> Json<Vec<&'static PricingPlan>> {
    Json(plans_for(query.target))
}

/// GET /api/v1/subscriptions/current
pub async fn handle_current(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<CurrentPlanResponse>, AppError> {
    let active = find_active(&state.db, user.profile.id).await?;
    Ok(Json(CurrentPlanResponse::from_subscription(active)))
}

/// POST /api/v1/subscriptions
///
/// Switching to the free plan only cancels the paid one.
pub async fn handle_upgrade(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UpgradeRequest>,
) -> Result<Json<CurrentPlanResponse>, AppError> {
    let active = find_active(&state.db, user.profile.id).await?;
    let current_plan_id = active
        .as_ref()
        .map(|s| s.plan_id.as_str())
        .unwrap_or(DEFAULT_PLAN_ID);

    let plan = validate_upgrade(user.role(), current_plan_id, request.plan_id.trim())?;
    let new_plan = (!plan.is_free()).then_some(plan.id);
    let created = switch_plan(&state.db, user.profile.id, new_plan).await?;

    info!("User {} switched to plan {}", user.profile.id, plan.id);
    Ok(Json(CurrentPlanResponse::from_subscription(created)))
}

/// POST /api/v1/subscriptions/cancel
pub async fn handle_cancel(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<CurrentPlanResponse>, AppError> {
    if cancel_active(&state.db, user.profile.id).await? == 0 {
        return Err(AppError::NotFound("No active subscription".to_string()));
    }
    info!("User {} cancelled their subscription", user.profile.id);
    Ok(Json(CurrentPlanResponse::from_subscription(None)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_to_recommended_plan() {
        let plan = validate_upgrade(Role::Seeker, "free", "resume-pro").unwrap();
        assert_eq!(plan.name, "Resume Pro");
    }

    #[test]
    fn test_upgrade_to_current_plan_conflicts() {
        assert!(matches!(
            validate_upgrade(Role::Seeker, "free", "free"),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            validate_upgrade(Role::Employer, "employer-pro", "employer-pro"),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_plan_must_target_caller_role() {
        assert!(matches!(
            validate_upgrade(Role::Seeker, "free", "employer-starter"),
            Err(AppError::UnprocessableEntity(_))
        ));
        assert!(matches!(
            validate_upgrade(Role::College, "free", "resume-pro"),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[test]
    fn test_unknown_plan_not_found() {
        assert!(matches!(
            validate_upgrade(Role::Seeker, "free", "platinum"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_no_subscription_defaults_to_free() {
        let response = CurrentPlanResponse::from_subscription(None);
        assert_eq!(response.plan_id, "free");
        assert_eq!(response.plan.map(|p| p.name), Some("Free"));
    }

    #[test]
    fn test_plans_query_parses_role() {
        let q: PlansQuery = serde_json::from_str(r#"{"target": "EMPLOYER"}"#).unwrap();
        assert_eq!(q.target, Some(Role::Employer));
    }
}
