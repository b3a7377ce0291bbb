// Membership plans: the static pricing catalog plus each user's active subscription.

pub mod handlers;
pub mod plans;
pub mod repo;
