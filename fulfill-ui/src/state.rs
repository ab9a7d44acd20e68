//! Calculator state shared across views.
//!
//! The standard fulfillment calculator and the custom requirements draft
//! live in [`CalculatorStore`], which outlives any single view and is saved
//! to the repository after every change. The other calculators keep their
//! state inside their own view.

use fulfill_core::calculations::{
    CustomRequirementsForm, StandardFulfillmentCalculator, StandardFulfillmentInput,
    StandardFulfillmentResult, ValidationErrors,
};
use fulfill_core::db::{FulfillmentRepository, RepositoryError};
use fulfill_core::models::{
    CustomRequirementsState, NewQuoteRequest, QuoteRequest, StandardFulfillmentRates,
    StandardFulfillmentState,
};
use tracing::{info, warn};

/// Which half of a calculator is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Form,
    Results,
}

impl Phase {
    pub fn from_submitted(is_submitted: bool) -> Self {
        if is_submitted {
            Self::Results
        } else {
            Self::Form
        }
    }
}

/// The calculators offered in the navigation column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Calculator {
    #[default]
    StandardFulfillment,
    Receiving,
    Storage,
    PickPack,
    FreeShipping,
    CustomRequirements,
}

impl Calculator {
    pub const ALL: [Self; 6] = [
        Self::StandardFulfillment,
        Self::Receiving,
        Self::Storage,
        Self::PickPack,
        Self::FreeShipping,
        Self::CustomRequirements,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::StandardFulfillment => "Standard Fulfillment",
            Self::Receiving => "Receiving",
            Self::Storage => "Storage",
            Self::PickPack => "Pick & Pack",
            Self::FreeShipping => "Free Shipping",
            Self::CustomRequirements => "Custom Requirements",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::StandardFulfillment => "Estimate your monthly 3PL costs in one place",
            Self::Receiving => "Inbound pallet, carton and unit receiving fees",
            Self::Storage => "Pallet storage by type and duration",
            Self::PickPack => "Per-order picking, packing and packaging",
            Self::FreeShipping => "Find a free shipping threshold that protects margin",
            Self::CustomRequirements => "Request a personalized quote",
        }
    }
}

/// Persisted state for the standard fulfillment and custom requirements
/// calculators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorStore {
    rates: StandardFulfillmentRates,
    pub standard_fulfillment: StandardFulfillmentState,
    pub custom_requirements: CustomRequirementsState,
}

impl CalculatorStore {
    /// A store holding default values for both calculators.
    pub fn new(rates: StandardFulfillmentRates) -> Self {
        Self {
            rates,
            standard_fulfillment: StandardFulfillmentState::default(),
            custom_requirements: CustomRequirementsState::default(),
        }
    }

    /// Restores saved state, using defaults for anything never saved.
    pub async fn load(
        repo: &dyn FulfillmentRepository,
        rates: StandardFulfillmentRates,
    ) -> Result<Self, RepositoryError> {
        let standard_fulfillment = repo.load_standard_fulfillment().await?;
        let custom_requirements = repo.load_custom_requirements().await?;
        info!(
            standard_saved = standard_fulfillment.is_some(),
            custom_saved = custom_requirements.is_some(),
            "calculator store loaded"
        );
        Ok(Self {
            rates,
            standard_fulfillment: standard_fulfillment.unwrap_or_default(),
            custom_requirements: custom_requirements.unwrap_or_default(),
        })
    }

    pub fn rates(&self) -> &StandardFulfillmentRates {
        &self.rates
    }

    // ── standard fulfillment ─────────────────────────────────────────────

    /// Replaces the inputs. The submitted flag is left alone.
    pub fn update_standard_fulfillment(
        &mut self,
        input: StandardFulfillmentInput,
    ) {
        self.standard_fulfillment.input = input;
    }

    /// Validates and prices the current inputs, switching to results on
    /// success.
    pub fn calculate_standard_costs(
        &mut self,
    ) -> Result<StandardFulfillmentResult, ValidationErrors> {
        let result = StandardFulfillmentCalculator::new(&self.rates)
            .calculate(&self.standard_fulfillment.input)
            .inspect_err(|errors| warn!(%errors, "standard fulfillment rejected"))?;
        self.standard_fulfillment.is_submitted = true;
        Ok(result)
    }

    pub fn standard_fulfillment_result(&self) -> Option<StandardFulfillmentResult> {
        self.standard_fulfillment.result(&self.rates)
    }

    pub fn standard_fulfillment_phase(&self) -> Phase {
        Phase::from_submitted(self.standard_fulfillment.is_submitted)
    }

    pub fn reset_standard_fulfillment(&mut self) {
        self.standard_fulfillment = StandardFulfillmentState::default();
    }

    // ── custom requirements ──────────────────────────────────────────────

    pub fn update_custom_requirements(
        &mut self,
        form: CustomRequirementsForm,
    ) {
        self.custom_requirements.form = form;
    }

    /// Validates the draft and returns the request to record.
    pub fn submit_custom_requirements(&mut self) -> Result<NewQuoteRequest, ValidationErrors> {
        let request = self
            .custom_requirements
            .form
            .submit()
            .inspect_err(|errors| warn!(%errors, "custom requirements rejected"))?;
        self.custom_requirements.is_submitted = true;
        Ok(request)
    }

    pub fn custom_requirements_phase(&self) -> Phase {
        Phase::from_submitted(self.custom_requirements.is_submitted)
    }

    pub fn reset_custom_requirements(&mut self) {
        self.custom_requirements = CustomRequirementsState::default();
    }

    // ── persistence ──────────────────────────────────────────────────────

    pub async fn save_standard_fulfillment(
        &self,
        repo: &dyn FulfillmentRepository,
    ) -> Result<(), RepositoryError> {
        repo.save_standard_fulfillment(&self.standard_fulfillment)
            .await
    }

    pub async fn save_custom_requirements(
        &self,
        repo: &dyn FulfillmentRepository,
    ) -> Result<(), RepositoryError> {
        repo.save_custom_requirements(&self.custom_requirements)
            .await
    }
}

/// Saves the draft and records the quote request in one go.
pub async fn record_quote_request(
    repo: &dyn FulfillmentRepository,
    state: &CustomRequirementsState,
    request: NewQuoteRequest,
) -> Result<QuoteRequest, RepositoryError> {
    repo.save_custom_requirements(state).await?;
    repo.create_quote_request(request).await
}
