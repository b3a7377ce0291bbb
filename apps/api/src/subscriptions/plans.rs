use serde::Serialize;

use crate::models::user::Role;

/// Plan a user is on when no subscription row is active.
pub const DEFAULT_PLAN_ID: &str = "free";

#[derive(Debug, Clone, Serialize)]
pub struct PricingPlan {
    pub id: &'static str,
    pub name: &'static str,
    pub price: &'static str,
    pub features: &'static [&'static str],
    pub recommended: bool,
    pub target: Role,
}

impl PricingPlan {
    pub fn is_free(&self) -> bool {
        self.id == DEFAULT_PLAN_ID
    }
}

pub static PRICING_PLANS: &[PricingPlan] = &[
    PricingPlan {
        id: "free",
        name: "Free",
        price: "₹0",
        features: &["Basic Job Search", "1 Resume Template", "Email Alerts"],
        recommended: false,
        target: Role::Seeker,
    },
    PricingPlan {
        id: "resume-pro",
        name: "Resume Pro",
        price: "₹199/mo",
        features: &["AI Resume Builder", "ATS Optimization", "Priority Support"],
        recommended: true,
        target: Role::Seeker,
    },
    PricingPlan {
        id: "career-boost",
        name: "Career Boost",
        price: "₹999/mo",
        features: &["All Pro Features", "Featured Profile", "Direct Recruiter DM"],
        recommended: false,
        target: Role::Seeker,
    },
    PricingPlan {
        id: "employer-starter",
        name: "Hiring Starter",
        price: "₹2,999/mo",
        features: &["5 Active Jobs", "AI Candidate Matching", "Basic Analytics"],
        recommended: false,
        target: Role::Employer,
    },
    PricingPlan {
        id: "employer-pro",
        name: "Hiring Pro",
        price: "₹9,999/mo",
        features: &["Unlimited Jobs", "Auto-Interview Bot", "WhatsApp Integration"],
        recommended: true,
        target: Role::Employer,
    },
];

pub fn find_plan(id: &str) -> Option<&'static PricingPlan> {
    PRICING_PLANS.iter().find(|p| p.id == id)
}

/// Catalog order is preserved.
pub fn plans_for(target: Option<Role>) -> Vec<&'static PricingPlan> {
    PRICING_PLANS
        .iter()
        .filter(|p| target.map_or(true, |t| p.target == t))
        .collect()
}
