use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A submitted custom-requirements lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub id: i64,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub requirements: String,
    pub created_at: DateTime<Utc>,
}

/// For creating new quote requests (no id or timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuoteRequest {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub requirements: String,
}
