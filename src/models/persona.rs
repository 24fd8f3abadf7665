// src/models/persona.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// O que sai do banco (Tabela user_personas)
#[derive(Debug, Clone, FromRow)]
pub struct PersonaRow {
    pub id: i32,
    pub client_id: i32,
    pub name: String,
    pub role: String,
    pub age_range: String,
    pub event_attributes: Vec<String>,
    pub motivations: Vec<String>,
    pub core_needs: Vec<String>,
    pub pain_points: Vec<String>,
    pub average_spend: Option<Decimal>,
    pub event_attendance: Option<i32>,
    pub engagement_rate: Option<Decimal>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonaMetrics {
    #[schema(value_type = Option<f64>, example = 120.5)]
    pub average_spend: Option<Decimal>,
    #[schema(example = 4)]
    pub event_attendance: Option<i32>,
    #[schema(value_type = Option<f64>, example = 37.5)]
    pub engagement_rate: Option<Decimal>,
}

impl PersonaMetrics {
    pub fn is_empty(&self) -> bool {
        self.average_spend.is_none() && self.event_attendance.is_none() && self.engagement_rate.is_none()
    }
}

// O que sai na API
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPersona {
    pub id: i32,
    pub client_id: i32,
    #[schema(example = "Marina, a organizadora")]
    pub name: String,
    #[schema(example = "Produtora de eventos")]
    pub role: String,
    #[schema(example = "25-34")]
    pub age_range: String,
    pub event_attributes: Vec<String>,
    pub motivations: Vec<String>,
    pub core_needs: Vec<String>,
    pub pain_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PersonaMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PersonaRow> for UserPersona {
    fn from(row: PersonaRow) -> Self {
        let metrics = PersonaMetrics {
            average_spend: row.average_spend,
            event_attendance: row.event_attendance,
            engagement_rate: row.engagement_rate,
        };

        Self {
            id: row.id,
            client_id: row.client_id,
            name: row.name,
            role: row.role,
            age_range: row.age_range,
            event_attributes: row.event_attributes,
            motivations: row.motivations,
            core_needs: row.core_needs,
            pain_points: row.pain_points,
            metrics: (!metrics.is_empty()).then_some(metrics),
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
