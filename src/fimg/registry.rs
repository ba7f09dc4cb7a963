use crate::config::DeviceConfig;
use crate::error::FimgResult;
use crate::g3d::device::G3dDevice;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// How often the registry has actually opened and closed the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub opens: u64,
    pub closes: u64,
}

#[derive(Debug, Default)]
struct RegistryState {
    users: usize,
    device: Option<Arc<G3dDevice>>,
    stats: RegistryStats,
}

/// Shares one open [`G3dDevice`] between any number of contexts.
///
/// The first [`acquire`](DeviceRegistry::acquire) opens the device, and dropping the last
/// [`DeviceLease`] closes it. Both transitions happen under a single lock together with the
/// user count, so a failed open leaves the count untouched and only the releaser that sees the
/// count reach zero closes the device.
#[derive(Debug)]
pub struct DeviceRegistry {
    config: DeviceConfig,
    state: Mutex<RegistryState>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new(config: DeviceConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            state: Mutex::new(RegistryState::default()),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &DeviceConfig {
        &self.config
    }

    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers one more user, opening the device if there was none.
    ///
    /// # Errors
    /// Returns the open error. The user count is unchanged in that case, so the next call
    /// tries to open again.
    pub fn acquire(self: &Arc<Self>) -> FimgResult<DeviceLease> {
        let mut state = self.lock_state();

        let device = match state.device.clone() {
            Some(device) => device,
            None => {
                let device = Arc::new(G3dDevice::open(&self.config)?);
                state.stats.opens += 1;
                state.device = Some(device.clone());
                device
            }
        };

        state.users += 1;
        tracing::trace!("fimg3D: {} device user(s)", state.users);
        drop(state);

        Ok(DeviceLease {
            registry: self.clone(),
            device: Some(device),
        })
    }

    fn release(&self) {
        let mut state = self.lock_state();

        let Some(users) = state.users.checked_sub(1) else {
            tracing::warn!("fimg3D warning: Device released more often than acquired.");
            return;
        };
        state.users = users;
        tracing::trace!("fimg3D: {users} device user(s)");

        if users > 0 {
            return;
        }

        let Some(device) = state.device.take() else {
            return;
        };
        state.stats.closes += 1;

        match Arc::try_unwrap(device) {
            Ok(mut device) => {
                device.close();
            }
            // Every lease hands its clone back before releasing, so this should not happen.
            Err(device) => {
                tracing::warn!(
                    "fimg3D warning: {} stray device reference(s) at last release.",
                    Arc::strong_count(&device) - 1
                );
            }
        }
    }

    /// Number of live leases.
    #[must_use]
    pub fn users(&self) -> usize {
        self.lock_state().users
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock_state().device.is_some()
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        self.lock_state().stats
    }
}

/// One registered user of the shared device.
///
/// The device stays open for as long as any lease exists. Dropping the lease releases it.
#[derive(Debug)]
pub struct DeviceLease {
    registry: Arc<DeviceRegistry>,
    device: Option<Arc<G3dDevice>>,
}

impl DeviceLease {
    /// The open device.
    ///
    /// # Panics
    /// Never in practice: the device is only taken away while the lease is being dropped.
    #[must_use]
    pub fn device(&self) -> &G3dDevice {
        self.device
            .as_deref()
            .expect("lease holds the device until dropped")
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }
}

impl Drop for DeviceLease {
    fn drop(&mut self) {
        // Hand our reference back first so the registry holds the only one.
        drop(self.device.take());
        self.registry.release();
    }
}
