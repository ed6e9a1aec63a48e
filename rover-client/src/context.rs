//! The explicitly constructed context every client call goes through.

use std::sync::{Arc, Mutex, MutexGuard};

use rover_api::{Customer, Device, Screen};
use rover_jsonapi::ResourceRegistry;
use rover_layout::{LayoutEngine, ScreenLayout, Size};
use tracing::info;

use crate::config::RoverConfig;
use crate::error::ClientError;
use crate::router::Router;
use crate::transport::{ReqwestTransport, Transport};

/// Owns the configuration and collaborators (transport, registry, device and
/// customer state). Construct one per SDK instance and pass it down.
pub struct RoverContext {
    config: RoverConfig,
    router: Router,
    transport: Arc<dyn Transport>,
    registry: Arc<ResourceRegistry>,
    device: Device,
    customer: Mutex<Customer>,
}

impl RoverContext {
    pub fn new(config: RoverConfig, transport: Arc<dyn Transport>) -> Result<Self, ClientError> {
        let router = Router::new(&config)?;
        let device = Device::new(config.device_id.clone());
        info!(base = %router.base(), device = %device.id, "rover context ready");
        Ok(Self {
            config,
            router,
            transport,
            registry: Arc::new(ResourceRegistry::with_builtins()),
            device,
            customer: Mutex::new(Customer::default()),
        })
    }

    /// Context with the default reqwest transport.
    pub fn connect(config: RoverConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(&config)?;
        Self::new(config, Arc::new(transport))
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn with_registry(mut self, registry: ResourceRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn config(&self) -> &RoverConfig {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn registry(&self) -> Arc<ResourceRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Snapshot of the current customer.
    pub fn customer(&self) -> Customer {
        self.lock_customer().clone()
    }

    pub fn update_customer(&self, update: impl FnOnce(&mut Customer)) {
        update(&mut self.lock_customer());
    }

    fn lock_customer(&self) -> MutexGuard<'_, Customer> {
        // A panic while holding the lock leaves plain data behind.
        self.customer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Lay out a screen with the configured density.
    pub fn layout_screen(
        &self,
        screen: &Screen,
        viewport: Size,
    ) -> Result<ScreenLayout, ClientError> {
        Ok(LayoutEngine::new(self.config.density)
            .with_provider(screen)
            .layout(viewport)?)
    }
}
