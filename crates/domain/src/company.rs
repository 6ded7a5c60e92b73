//! Company — owner of a fleet of robots.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, TerminalError};
use crate::id::CompanyId;

labelled_enum! {
    /// Logistics role a company plays.
    CompanyType {
        Inbound => "inbound",
        Outbound => "outbound",
        ThirdParty => "third_party",
        FourthParty => "fourth_party",
        Distribution => "distribution",
        Reverse => "reverse",
    }
}

/// A company operating robots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CompanyType,
}

impl Company {
    /// Create a builder for constructing a [`Company`].
    #[must_use]
    pub fn builder() -> CompanyBuilder {
        CompanyBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Configuration`] when `name` is empty.
    pub fn validate(&self) -> Result<(), TerminalError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Company`].
#[derive(Debug, Default)]
pub struct CompanyBuilder {
    id: Option<CompanyId>,
    name: Option<String>,
    kind: Option<CompanyType>,
}

impl CompanyBuilder {
    #[must_use]
    pub fn id(mut self, id: CompanyId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: CompanyType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Consume the builder, validate, and return a [`Company`].
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Configuration`] if `name` is missing or empty.
    pub fn build(self) -> Result<Company, TerminalError> {
        let company = Company {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            kind: self.kind.unwrap_or(CompanyType::ThirdParty),
        };
        company.validate()?;
        Ok(company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_company_when_name_provided() {
        let company = Company::builder()
            .name("Acme Logistics")
            .kind(CompanyType::Distribution)
            .build()
            .unwrap();
        assert_eq!(company.kind, CompanyType::Distribution);
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        assert!(matches!(
            Company::builder().build(),
            Err(TerminalError::Configuration(ConfigurationError::EmptyName))
        ));
    }

    #[test]
    fn should_serialize_kind_as_type() {
        let company = Company::builder()
            .name("Acme")
            .kind(CompanyType::FourthParty)
            .build()
            .unwrap();
        let json = serde_json::to_value(&company).unwrap();
        assert_eq!(json["type"], "fourth_party");
    }

    #[test]
    fn should_list_every_company_type() {
        assert_eq!(CompanyType::ALL.len(), 6);
    }
}
