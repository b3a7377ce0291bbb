//! Identity: the hosted auth service client, the bearer-token extractor and
//! the sign-up / sign-in / sign-out / session endpoints.

pub mod client;
pub mod extractor;
pub mod handlers;
pub mod profiles;

pub use client::{AuthClient, AuthProvider};
pub use extractor::CurrentUser;
