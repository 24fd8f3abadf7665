// src/models/section.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::asset::LogoType;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HiddenSection {
    pub client_id: i32,
    pub section_type: LogoType,
    pub is_hidden: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HideSectionPayload {
    #[schema(example = "favicon")]
    pub section_type: LogoType,
}
