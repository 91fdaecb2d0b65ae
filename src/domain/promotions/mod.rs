//! Promotions
//!
//! Promo code storage, constraint validation and discount eligibility. The
//! validator only ever reports *why* a code fails; whether that failure is
//! silently ignored or surfaced as an error is the calling site's policy.

pub mod eligibility;
pub mod errors;
pub mod models;
pub mod store;
pub mod validator;

pub use errors::PromotionsError;
pub use store::*;
pub use validator::PromoRejection;
