//! Device service — use-cases for the sensor registry.

use freight_terminal_domain::device::Device;
use freight_terminal_domain::error::{ConfigurationError, TerminalError};
use freight_terminal_domain::id::DeviceId;

use super::not_found;
use crate::ports::DeviceRepository;

/// Application service for device CRUD operations.
pub struct DeviceService<R> {
    repo: R,
}

impl<R: DeviceRepository> DeviceService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Register a new device after validating its bounds and name.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Configuration`] if invariants fail or the
    /// name is already taken, or a storage error propagated from the
    /// repository.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name))]
    pub async fn create_device(&self, device: Device) -> Result<Device, TerminalError> {
        device.validate()?;
        self.ensure_unique_name(&device).await?;
        self.repo.create(device).await
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, TerminalError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("Device", id))
    }

    /// List all devices.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_devices(&self) -> Result<Vec<Device>, TerminalError> {
        self.repo.get_all().await
    }

    /// Replace an existing device.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] for an unknown device,
    /// [`TerminalError::Configuration`] if invariants fail, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, device), fields(device_id = %device.id))]
    pub async fn update_device(&self, device: Device) -> Result<Device, TerminalError> {
        self.get_device(device.id).await?;
        device.validate()?;
        self.ensure_unique_name(&device).await?;
        self.repo.update(device).await
    }

    /// Delete a device and the rules configured against it.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] for an unknown device, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_device(&self, id: DeviceId) -> Result<(), TerminalError> {
        self.get_device(id).await?;
        self.repo.delete(id).await
    }

    async fn ensure_unique_name(&self, device: &Device) -> Result<(), TerminalError> {
        match self.repo.find_by_name(&device.name).await? {
            Some(existing) if existing.id != device.id => {
                Err(ConfigurationError::DuplicateDeviceName.into())
            }
            _ => Ok(()),
        }
    }
}
