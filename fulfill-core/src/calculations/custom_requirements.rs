//! Lead-capture form for quotes that fall outside the standard calculators.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::validation::ValidationErrors;
use crate::models::NewQuoteRequest;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRequirementsForm {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub requirements: String,
}

impl CustomRequirementsForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            self.company_name.trim().is_empty(),
            "company_name",
            "Company name is required",
        );
        errors.check(
            self.contact_name.trim().is_empty(),
            "contact_name",
            "Contact name is required",
        );
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !EMAIL.is_match(&self.email) {
            errors.add("email", "Please enter a valid email address");
        }
        errors.check(self.phone.trim().is_empty(), "phone", "Phone number is required");
        errors.check(
            self.requirements.trim().is_empty(),
            "requirements",
            "Please describe your requirements",
        );
        errors.into_result()
    }

    /// Validates the form and turns it into a quote request with trimmed fields.
    pub fn submit(&self) -> Result<NewQuoteRequest, ValidationErrors> {
        self.validate()?;
        debug!(company = self.company_name.trim(), "custom requirements submitted");
        Ok(NewQuoteRequest {
            company_name: self.company_name.trim().to_string(),
            contact_name: self.contact_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            requirements: self.requirements.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn filled_form() -> CustomRequirementsForm {
        CustomRequirementsForm {
            company_name: "Acme Outdoor".to_string(),
            contact_name: "Sam Rivera".to_string(),
            email: "sam@acme.example".to_string(),
            phone: "555-0100".to_string(),
            requirements: "Kitting for 3 SKUs".to_string(),
        }
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = CustomRequirementsForm::default().validate().unwrap_err();

        assert_eq!(errors.len(), 5);
        assert_eq!(errors.message_for("email"), Some("Email is required"));
        assert_eq!(
            errors.message_for("requirements"),
            Some("Please describe your requirements")
        );
    }

    #[test]
    fn whitespace_only_fields_are_missing() {
        let form = CustomRequirementsForm {
            company_name: "   ".to_string(),
            ..filled_form()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(
            errors.message_for("company_name"),
            Some("Company name is required")
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        for email in ["sam", "sam@acme", "sam @acme.example", "@acme.example"] {
            let form = CustomRequirementsForm {
                email: email.to_string(),
                ..filled_form()
            };
            assert_eq!(
                form.validate().unwrap_err().message_for("email"),
                Some("Please enter a valid email address"),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn email_with_surrounding_spaces_is_rejected() {
        for email in [" sam@acme.example", "sam@acme.example\t"] {
            let form = CustomRequirementsForm {
                email: email.to_string(),
                ..filled_form()
            };
            assert_eq!(
                form.validate().unwrap_err().message_for("email"),
                Some("Please enter a valid email address"),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn submit_trims_fields() {
        let form = CustomRequirementsForm {
            contact_name: "  Sam Rivera ".to_string(),
            ..filled_form()
        };

        let request = form.submit().unwrap();

        assert_eq!(request.contact_name, "Sam Rivera");
        assert_eq!(request.company_name, "Acme Outdoor");
    }
}
