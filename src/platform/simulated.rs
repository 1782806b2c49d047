//! In-memory torch backend
//!
//! Simulates torch hardware for unit and property tests. External events (another process seizing the camera,
//! toggling the torch elsewhere) are injected through dedicated methods.
//! Notifications can be deferred to model a platform dispatcher that
//! confirms requests some time after they were issued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::{DeviceId, TorchError, TorchNotification};
use crate::platform::{CallbackId, TorchBackend, TorchCallback};

#[derive(Debug)]
struct SimulatedDevice {
    id: DeviceId,
    enabled: bool,
    held_elsewhere: bool,
}

#[derive(Default)]
struct SimulatedInner {
    devices: Vec<SimulatedDevice>,
    callbacks: Vec<(CallbackId, TorchCallback)>,
    deferred: bool,
    pending: Vec<TorchNotification>,
    fail_next: Option<TorchError>,
    requests: usize,
    transitions: usize,
    registrations: usize,
    unregistrations: usize,
}

/// Torch hardware simulated in memory
pub struct SimulatedTorch {
    inner: Mutex<SimulatedInner>,
    next_id: AtomicU64,
}

impl SimulatedTorch {
    /// Creates a simulated platform exposing the given torch device ids
    pub fn new<I, S>(device_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let devices = device_ids
            .into_iter()
            .map(|id| SimulatedDevice {
                id: DeviceId::new(id),
                enabled: false,
                held_elsewhere: false,
            })
            .collect();

        Self {
            inner: Mutex::new(SimulatedInner {
                devices,
                ..Default::default()
            }),
            next_id: AtomicU64::new(1),
        }
    }

    /// A platform with a single rear torch, id `"0"`
    pub fn single_torch() -> Self {
        Self::new(["0"])
    }

    /// A platform without any torch-capable device
    pub fn without_torch() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Queue notifications instead of delivering them immediately
    pub fn set_deferred(&self, deferred: bool) {
        self.lock().deferred = deferred;
    }

    /// Delivers notifications queued while deferred, returns how many were sent
    pub fn deliver_pending(&self) -> usize {
        let (pending, callbacks) = {
            let mut inner = self.lock();
            let pending = std::mem::take(&mut inner.pending);
            (pending, Self::callback_snapshot(&inner))
        };
        let count = pending.len();
        for notification in pending {
            Self::dispatch(&callbacks, notification);
        }
        count
    }

    /// Makes the next `set_torch_mode` call fail with `error`
    pub fn fail_next(&self, error: TorchError) {
        self.lock().fail_next = Some(error);
    }

    /// Another process opens the camera: the torch goes dark and the device
    /// rejects requests until [`release`](Self::release)
    pub fn seize(&self, device: &DeviceId) {
        let notification = {
            let mut inner = self.lock();
            let Some(dev) = inner.devices.iter_mut().find(|d| &d.id == device) else {
                return;
            };
            dev.held_elsewhere = true;
            if dev.enabled {
                dev.enabled = false;
                inner.transitions += 1;
            }
            TorchNotification::Unavailable {
                device: device.clone(),
            }
        };
        self.notify(notification);
    }

    /// The other process closes the camera; the torch becomes available, off
    pub fn release(&self, device: &DeviceId) {
        let notification = {
            let mut inner = self.lock();
            let Some(dev) = inner.devices.iter_mut().find(|d| &d.id == device) else {
                return;
            };
            if !dev.held_elsewhere {
                return;
            }
            dev.held_elsewhere = false;
            TorchNotification::ModeChanged {
                device: device.clone(),
                enabled: false,
            }
        };
        self.notify(notification);
    }

    /// Another application switches the torch
    pub fn external_set(&self, device: &DeviceId, enabled: bool) {
        let notification = {
            let mut inner = self.lock();
            let Some(dev) = inner.devices.iter_mut().find(|d| &d.id == device) else {
                return;
            };
            if dev.held_elsewhere || dev.enabled == enabled {
                return;
            }
            dev.enabled = enabled;
            inner.transitions += 1;
            TorchNotification::ModeChanged {
                device: device.clone(),
                enabled,
            }
        };
        self.notify(notification);
    }

    /// Emits a raw notification without touching device state
    pub fn inject(&self, notification: TorchNotification) {
        self.notify(notification);
    }

    pub fn is_enabled(&self, device: &DeviceId) -> bool {
        self.lock()
            .devices
            .iter()
            .any(|d| &d.id == device && d.enabled)
    }

    /// Number of currently registered callbacks
    pub fn active_callbacks(&self) -> usize {
        self.lock().callbacks.len()
    }

    pub fn registration_count(&self) -> usize {
        self.lock().registrations
    }

    pub fn unregistration_count(&self) -> usize {
        self.lock().unregistrations
    }

    /// Set-mode calls that reached a device
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    /// Hardware on/off transitions performed so far
    pub fn transition_count(&self) -> usize {
        self.lock().transitions
    }

    fn lock(&self) -> MutexGuard<'_, SimulatedInner> {
        // Poisoning is ignored: every mutation completes before any callback runs
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn callback_snapshot(inner: &SimulatedInner) -> Vec<TorchCallback> {
        inner.callbacks.iter().map(|(_, cb)| cb.clone()).collect()
    }

    fn dispatch(callbacks: &[TorchCallback], notification: TorchNotification) {
        for callback in callbacks {
            callback(notification.clone());
        }
    }

    fn notify(&self, notification: TorchNotification) {
        let callbacks = {
            let mut inner = self.lock();
            if inner.deferred {
                inner.pending.push(notification);
                return;
            }
            Self::callback_snapshot(&inner)
        };
        // Callbacks run without the lock held so they may call back into us
        Self::dispatch(&callbacks, notification);
    }
}

impl TorchBackend for SimulatedTorch {
    fn torch_devices(&self) -> Result<Vec<DeviceId>, TorchError> {
        Ok(self.lock().devices.iter().map(|d| d.id.clone()).collect())
    }

    fn set_torch_mode(&self, device: &DeviceId, enabled: bool) -> Result<(), TorchError> {
        let notification = {
            let mut inner = self.lock();
            if let Some(error) = inner.fail_next.take() {
                return Err(error);
            }

            let Some(index) = inner.devices.iter().position(|d| &d.id == device) else {
                return Err(TorchError::Unknown(format!("unknown torch device {device}")));
            };
            if inner.devices[index].held_elsewhere {
                return Err(TorchError::DeviceBusy {
                    device: device.clone(),
                });
            }

            inner.requests += 1;
            if inner.devices[index].enabled == enabled {
                return Ok(());
            }
            inner.devices[index].enabled = enabled;
            inner.transitions += 1;

            TorchNotification::ModeChanged {
                device: device.clone(),
                enabled,
            }
        };

        self.notify(notification);
        Ok(())
    }

    fn register_callback(&self, callback: TorchCallback) -> Result<CallbackId, TorchError> {
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let initial: Vec<TorchNotification> = {
            let mut inner = self.lock();
            inner.callbacks.push((id, callback.clone()));
            inner.registrations += 1;
            inner
                .devices
                .iter()
                .map(|d| {
                    if d.held_elsewhere {
                        TorchNotification::Unavailable { device: d.id.clone() }
                    } else {
                        TorchNotification::ModeChanged {
                            device: d.id.clone(),
                            enabled: d.enabled,
                        }
                    }
                })
                .collect()
        };

        for notification in initial {
            callback(notification);
        }

        Ok(id)
    }

    fn unregister_callback(&self, id: CallbackId) {
        let mut inner = self.lock();
        let before = inner.callbacks.len();
        inner.callbacks.retain(|(registered, _)| *registered != id);
        if inner.callbacks.len() != before {
            inner.unregistrations += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (TorchCallback, Arc<Mutex<Vec<TorchNotification>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: TorchCallback = Arc::new(move |n: TorchNotification| sink.lock().unwrap().push(n));
        (callback, seen)
    }

    #[test]
    fn registration_reports_current_mode() {
        let torch = SimulatedTorch::single_torch();
        let (callback, seen) = recorder();

        torch.register_callback(callback).unwrap();

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[TorchNotification::ModeChanged {
                device: DeviceId::new("0"),
                enabled: false
            }]
        );
        assert_eq!(torch.active_callbacks(), 1);
    }

    #[test]
    fn set_mode_notifies_only_on_change() {
        let torch = SimulatedTorch::single_torch();
        let (callback, seen) = recorder();
        torch.register_callback(callback).unwrap();
        let device = DeviceId::new("0");

        torch.set_torch_mode(&device, true).unwrap();
        torch.set_torch_mode(&device, true).unwrap();

        assert!(torch.is_enabled(&device));
        assert_eq!(torch.request_count(), 2);
        assert_eq!(torch.transition_count(), 1);
        assert_eq!(seen.lock().unwrap().len(), 2); // initial report + one change
    }

    #[test]
    fn seized_device_rejects_requests() {
        let torch = SimulatedTorch::single_torch();
        let device = DeviceId::new("0");
        torch.set_torch_mode(&device, true).unwrap();

        torch.seize(&device);

        assert!(!torch.is_enabled(&device));
        assert_eq!(
            torch.set_torch_mode(&device, true),
            Err(TorchError::DeviceBusy { device: device.clone() })
        );

        torch.release(&device);
        assert!(torch.set_torch_mode(&device, true).is_ok());
    }

    #[test]
    fn deferred_notifications_wait_for_delivery() {
        let torch = SimulatedTorch::single_torch();
        let (callback, seen) = recorder();
        torch.register_callback(callback).unwrap();
        torch.set_deferred(true);

        torch.set_torch_mode(&DeviceId::new("0"), true).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);

        assert_eq!(torch.deliver_pending(), 1);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn unregister_is_counted_once() {
        let torch = SimulatedTorch::single_torch();
        let (callback, _seen) = recorder();
        let id = torch.register_callback(callback).unwrap();

        torch.unregister_callback(id);
        torch.unregister_callback(id);

        assert_eq!(torch.active_callbacks(), 0);
        assert_eq!(torch.unregistration_count(), 1);
    }

    #[test]
    fn unknown_device_and_forced_failures() {
        let torch = SimulatedTorch::without_torch();
        assert!(torch.torch_devices().unwrap().is_empty());
        assert!(matches!(
            torch.set_torch_mode(&DeviceId::new("9"), true),
            Err(TorchError::Unknown(_))
        ));

        let torch = SimulatedTorch::single_torch();
        torch.fail_next(TorchError::Unknown("driver fault".into()));
        assert!(torch.set_torch_mode(&DeviceId::new("0"), true).is_err());
        assert!(torch.set_torch_mode(&DeviceId::new("0"), true).is_ok());
    }
}
