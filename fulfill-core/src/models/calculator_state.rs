use serde::{Deserialize, Serialize};

use crate::calculations::{
    CustomRequirementsForm, StandardFulfillmentCalculator, StandardFulfillmentInput,
    StandardFulfillmentResult,
};
use crate::models::StandardFulfillmentRates;

/// Saved standard fulfillment calculator: the inputs and whether results are showing.
///
/// Results are not stored; [`StandardFulfillmentState::result`] recomputes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardFulfillmentState {
    pub input: StandardFulfillmentInput,
    pub is_submitted: bool,
}

impl StandardFulfillmentState {
    /// The result to display, if the calculator was submitted with valid input.
    pub fn result(
        &self,
        rates: &StandardFulfillmentRates,
    ) -> Option<StandardFulfillmentResult> {
        if !self.is_submitted {
            return None;
        }
        StandardFulfillmentCalculator::new(rates)
            .calculate(&self.input)
            .ok()
    }
}

/// Saved custom requirements draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRequirementsState {
    pub form: CustomRequirementsForm,
    pub is_submitted: bool,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn unsubmitted_state_has_no_result() {
        let state = StandardFulfillmentState::default();

        assert_eq!(state.result(&StandardFulfillmentRates::default()), None);
    }

    #[test]
    fn submitted_state_recomputes_result() {
        let state = StandardFulfillmentState {
            is_submitted: true,
            ..StandardFulfillmentState::default()
        };

        let result = state.result(&StandardFulfillmentRates::default()).unwrap();

        assert_eq!(result.total_monthly_cost, dec!(6220.00));
    }

    #[test]
    fn submitted_state_with_invalid_input_has_no_result() {
        let mut state = StandardFulfillmentState {
            is_submitted: true,
            ..StandardFulfillmentState::default()
        };
        state.input.monthly_order_volume = 0;

        assert_eq!(state.result(&StandardFulfillmentRates::default()), None);
    }
}
