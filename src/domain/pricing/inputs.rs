//! Cart Line Inputs

use serde::{Deserialize, Serialize};

use crate::domain::catalog::models::{ProductUuid, VariantUuid};

/// One raw cart line as supplied by the caller.
///
/// Deliberately carries no price: unit prices are always read fresh from the
/// catalog at calculation time, never trusted from client input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineInput {
    /// Caller-supplied line id; generated when omitted.
    #[serde(default)]
    pub line_id: Option<String>,
    pub product_uuid: ProductUuid,
    #[serde(default)]
    pub variant_uuid: Option<VariantUuid>,
    pub quantity: u32,
}
