//! Torch state adapter
//!
//! Bridges the platform's asynchronous torch notifications to a single
//! observable [`TorchState`]. Notifications are queued by the platform
//! dispatcher thread and applied on the UI thread in [`TorchAdapter::pump`],
//! which is the only place the canonical state is written.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use crate::domain::{DeviceId, TorchError, TorchNotification, TorchState};
use crate::platform::{CallbackId, TorchBackend, TorchCallback};

/// Wakes the UI thread after a notification has been queued
pub type UiWaker = Arc<dyn Fn() + Send + Sync>;

/// Render callback invoked on the UI thread after each state change
pub type StateListener = Box<dyn FnMut(TorchState)>;

/// RAII wrapper for a backend callback registration
///
/// Unregisters exactly once when dropped, on every exit path.
pub struct TorchSubscription {
    backend: Arc<dyn TorchBackend>,
    id: Option<CallbackId>,
}

impl TorchSubscription {
    /// Registers `callback` with the backend
    pub fn register(
        backend: Arc<dyn TorchBackend>,
        callback: TorchCallback,
    ) -> Result<Self, TorchError> {
        let id = backend.register_callback(callback)?;
        tracing::debug!(callback = id.0, "torch callback registered");
        Ok(Self {
            backend,
            id: Some(id),
        })
    }
}

impl Drop for TorchSubscription {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.backend.unregister_callback(id);
            tracing::debug!(callback = id.0, "torch callback unregistered");
        }
    }
}

/// Single source of truth for the confirmed torch state
pub struct TorchAdapter {
    backend: Arc<dyn TorchBackend>,
    /// Primary torch, the first device the platform enumerates
    device: Option<DeviceId>,
    state: TorchState,
    inbox: Receiver<TorchNotification>,
    listeners: Vec<StateListener>,
    /// Unregisters from the backend when the adapter is dropped
    _subscription: TorchSubscription,
}

impl TorchAdapter {
    /// Subscribes to `backend` and applies its initial report
    ///
    /// A platform without any torch still yields an adapter; requests then
    /// fail with [`TorchError::Unavailable`].
    pub fn new(backend: Arc<dyn TorchBackend>, waker: Option<UiWaker>) -> Result<Self, TorchError> {
        let device = match backend.torch_devices() {
            Ok(devices) => devices.into_iter().next(),
            Err(err) => {
                tracing::warn!(error = %err, "torch device enumeration failed");
                None
            }
        };
        if device.is_none() {
            tracing::warn!("no torch-capable device found");
        }

        let (sender, inbox) = mpsc::channel();
        let callback: TorchCallback = Arc::new(move |notification: TorchNotification| {
            // The receiver is gone once the adapter is torn down
            if sender.send(notification).is_ok() {
                if let Some(wake) = &waker {
                    wake();
                }
            }
        });
        let subscription = TorchSubscription::register(Arc::clone(&backend), callback)?;

        let mut adapter = Self {
            backend,
            device,
            state: TorchState::Off,
            inbox,
            listeners: Vec::new(),
            _subscription: subscription,
        };
        adapter.pump();

        tracing::info!(
            device = adapter.device.as_ref().map(DeviceId::as_str),
            state = %adapter.state,
            "torch adapter ready"
        );
        Ok(adapter)
    }

    /// Last confirmed torch state as a boolean
    pub fn current(&self) -> bool {
        self.state.is_on()
    }

    pub fn state(&self) -> TorchState {
        self.state
    }

    pub fn device(&self) -> Option<&DeviceId> {
        self.device.as_ref()
    }

    /// Registers a render callback for state changes
    pub fn observe<F>(&mut self, listener: F)
    where
        F: FnMut(TorchState) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Requests the torch be switched on or off
    ///
    /// The confirmed state only changes once the platform notifies; a failed
    /// request is logged and leaves the state untouched.
    pub fn set_torch(&mut self, enable: bool) -> Result<(), TorchError> {
        let result = self
            .primary_device()
            .and_then(|device| self.backend.set_torch_mode(&device, enable));

        match &result {
            Ok(()) => tracing::debug!(requested = enable, "torch request accepted"),
            Err(err) => tracing::error!(requested = enable, error = %err, "torch request failed"),
        }
        result
    }

    /// Applies queued notifications in arrival order
    ///
    /// Returns the new state if it differs from the state before the call.
    pub fn pump(&mut self) -> Option<TorchState> {
        let before = self.state;
        while let Ok(notification) = self.inbox.try_recv() {
            self.apply(notification);
        }
        (self.state != before).then_some(self.state)
    }

    fn apply(&mut self, notification: TorchNotification) {
        if let Some(primary) = &self.device {
            if notification.device() != primary {
                tracing::trace!(device = %notification.device(), "ignoring notification for another device");
                return;
            }
        }

        if let TorchNotification::Unavailable { device } = &notification {
            tracing::warn!(%device, "torch became unavailable");
        }

        let next = notification.resulting_state();
        if next == self.state {
            return;
        }
        self.state = next;
        tracing::info!(state = %next, "torch state confirmed");
        for listener in &mut self.listeners {
            listener(next);
        }
    }

    fn primary_device(&mut self) -> Result<DeviceId, TorchError> {
        if let Some(device) = &self.device {
            return Ok(device.clone());
        }
        // Nothing was enumerated at construction; the platform may have
        // attached a camera since then
        let device = self
            .backend
            .torch_devices()?
            .into_iter()
            .next()
            .ok_or(TorchError::Unavailable)?;
        self.device = Some(device.clone());
        Ok(device)
    }
}
