//! Company service — use-cases for companies.

use freight_terminal_domain::company::{Company, CompanyType};
use freight_terminal_domain::error::TerminalError;
use freight_terminal_domain::id::CompanyId;

use super::not_found;
use crate::ports::CompanyRepository;

/// Application service for company CRUD operations.
pub struct CompanyService<R> {
    repo: R,
}

impl<R: CompanyRepository> CompanyService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Every company type, in catalogue order.
    #[must_use]
    pub fn company_types(&self) -> &'static [CompanyType] {
        CompanyType::ALL
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::Configuration`] for a blank name, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, company), fields(company_name = %company.name))]
    pub async fn create_company(&self, company: Company) -> Result<Company, TerminalError> {
        company.validate()?;
        self.repo.create(company).await
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when no company with `id` exists.
    #[tracing::instrument(skip(self))]
    pub async fn get_company(&self, id: CompanyId) -> Result<Company, TerminalError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("Company", id))
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_companies(&self) -> Result<Vec<Company>, TerminalError> {
        self.repo.get_all().await
    }

    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] for an unknown company or
    /// [`TerminalError::Configuration`] for a blank name.
    #[tracing::instrument(skip(self, company), fields(company_id = %company.id))]
    pub async fn update_company(&self, company: Company) -> Result<Company, TerminalError> {
        self.get_company(company.id).await?;
        company.validate()?;
        self.repo.update(company).await
    }

    /// Delete a company with its robots and their services.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] for an unknown company.
    #[tracing::instrument(skip(self))]
    pub async fn delete_company(&self, id: CompanyId) -> Result<(), TerminalError> {
        self.get_company(id).await?;
        self.repo.delete(id).await
    }
}
