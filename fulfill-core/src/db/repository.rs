use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CustomRequirementsState, NewQuoteRequest, QuoteRequest, RateCard, StandardFulfillmentState,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait FulfillmentRepository: Send + Sync {
    // Rate cards
    async fn get_rate_card(
        &self,
        name: &str,
    ) -> Result<RateCard, RepositoryError>;
    async fn list_rate_cards(&self) -> Result<Vec<String>, RepositoryError>;

    /// Inserts the card or replaces every rate of an existing card with the same name.
    async fn save_rate_card(
        &self,
        card: &RateCard,
    ) -> Result<(), RepositoryError>;
    async fn delete_rate_card(
        &self,
        name: &str,
    ) -> Result<(), RepositoryError>;

    // Persisted calculator state
    async fn load_standard_fulfillment(
        &self
    ) -> Result<Option<StandardFulfillmentState>, RepositoryError>;
    async fn save_standard_fulfillment(
        &self,
        state: &StandardFulfillmentState,
    ) -> Result<(), RepositoryError>;
    async fn load_custom_requirements(
        &self
    ) -> Result<Option<CustomRequirementsState>, RepositoryError>;
    async fn save_custom_requirements(
        &self,
        state: &CustomRequirementsState,
    ) -> Result<(), RepositoryError>;

    // Quote requests
    async fn create_quote_request(
        &self,
        request: NewQuoteRequest,
    ) -> Result<QuoteRequest, RepositoryError>;
    async fn get_quote_request(
        &self,
        id: i64,
    ) -> Result<QuoteRequest, RepositoryError>;
    async fn list_quote_requests(&self) -> Result<Vec<QuoteRequest>, RepositoryError>;
    async fn delete_quote_request(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;
}
