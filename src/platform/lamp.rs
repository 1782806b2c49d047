//! Windows torch backend built on the WinRT `Windows.Devices.Lights.Lamp` API
//!
//! A `Lamp` only raises `AvailabilityChanged`; there is no mode-changed
//! event. After every accepted `SetIsEnabled` the backend reads `IsEnabled`
//! back and reports that as the confirmed mode.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use windows::Devices::Enumeration::DeviceInformation;
use windows::Devices::Lights::{Lamp, LampAvailabilityChangedEventArgs};
use windows::Foundation::{EventRegistrationToken, TypedEventHandler};
use windows::core::HRESULT;

use crate::domain::{DeviceId, TorchError, TorchNotification};
use crate::platform::{CallbackId, TorchBackend, TorchCallback};

/// HRESULTs meaning the lamp is held by another application
const BUSY_HRESULTS: [HRESULT; 3] = [
    HRESULT(0x8007_0005_u32 as i32), // E_ACCESSDENIED
    HRESULT(0x8007_0020_u32 as i32), // ERROR_SHARING_VIOLATION
    HRESULT(0x8007_00AA_u32 as i32), // ERROR_BUSY
];

struct Shared {
    callbacks: Vec<(CallbackId, TorchCallback)>,
    available: bool,
}

impl Shared {
    fn snapshot(&self) -> Vec<TorchCallback> {
        self.callbacks.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Runs every registered callback without holding the lock
fn dispatch(shared: &Mutex<Shared>, notification: TorchNotification) {
    let callbacks = lock(shared).snapshot();
    for callback in callbacks {
        callback(notification.clone());
    }
}

struct OpenLamp {
    lamp: Lamp,
    device: DeviceId,
    token: EventRegistrationToken,
}

/// The default system lamp, usually the rear camera flash
pub struct LampTorch {
    lamp: Option<OpenLamp>,
    shared: Arc<Mutex<Shared>>,
    next_id: AtomicU64,
}

impl LampTorch {
    /// Opens the first lamp the system reports
    ///
    /// A machine without a lamp, or one where the lamp cannot be opened (for
    /// example when camera access is denied), yields a backend with no
    /// devices; requests then fail with [`TorchError::Unavailable`].
    pub fn open() -> Self {
        let mut backend = Self::detached();
        let attached = Self::find_lamp()
            .and_then(|lamp| lamp.map(|lamp| Self::attach(lamp, &backend.shared)).transpose());
        match attached {
            Ok(Some(open)) => backend.lamp = Some(open),
            Ok(None) => tracing::warn!("no lamp device found"),
            Err(err) => tracing::warn!(error = %err, "lamp could not be opened"),
        }
        backend
    }

    /// A backend without any lamp attached
    pub fn detached() -> Self {
        Self {
            lamp: None,
            shared: Arc::new(Mutex::new(Shared {
                callbacks: Vec::new(),
                available: false,
            })),
            next_id: AtomicU64::new(1),
        }
    }

    fn find_lamp() -> Result<Option<Lamp>, TorchError> {
        let selector = Lamp::GetDeviceSelector().map_err(unknown)?;
        let devices = DeviceInformation::FindAllAsyncAqsFilter(&selector)
            .and_then(|op| op.get())
            .map_err(unknown)?;

        if devices.Size().map_err(unknown)? == 0 {
            return Ok(None);
        }

        let id = devices.GetAt(0).and_then(|info| info.Id()).map_err(unknown)?;
        let lamp = Lamp::FromIdAsync(&id)
            .and_then(|op| op.get())
            .map_err(unknown)?;
        Ok(Some(lamp))
    }

    fn attach(lamp: Lamp, shared: &Arc<Mutex<Shared>>) -> Result<OpenLamp, TorchError> {
        let device = DeviceId::new(lamp.DeviceId().map_err(unknown)?.to_string());

        let handler_shared = Arc::clone(shared);
        let handler_device = device.clone();
        let handler = TypedEventHandler::new(
            move |sender: &Option<Lamp>, args: &Option<LampAvailabilityChangedEventArgs>| {
                let available = match args {
                    Some(args) => args.IsAvailable()?,
                    None => return Ok(()),
                };
                lock(&handler_shared).available = available;

                let notification = if available {
                    let enabled = match sender {
                        Some(lamp) => lamp.IsEnabled()?,
                        None => false,
                    };
                    TorchNotification::ModeChanged {
                        device: handler_device.clone(),
                        enabled,
                    }
                } else {
                    TorchNotification::Unavailable {
                        device: handler_device.clone(),
                    }
                };
                tracing::debug!(?notification, "lamp availability changed");
                dispatch(&handler_shared, notification);
                Ok(())
            },
        );
        let token = lamp.AvailabilityChanged(&handler).map_err(unknown)?;
        lock(shared).available = true;

        tracing::info!(device = %device, "lamp opened");
        Ok(OpenLamp {
            lamp,
            device,
            token,
        })
    }

    fn lamp_for(&self, device: &DeviceId) -> Result<&Lamp, TorchError> {
        let open = self.lamp.as_ref().ok_or(TorchError::Unavailable)?;
        if &open.device != device {
            return Err(TorchError::Unknown(format!("no lamp with id {device}")));
        }
        Ok(&open.lamp)
    }

    /// Current mode of the lamp as a notification
    fn current_notification(&self) -> Option<TorchNotification> {
        let open = self.lamp.as_ref()?;
        let available = lock(&self.shared).available;
        if !available {
            return Some(TorchNotification::Unavailable {
                device: open.device.clone(),
            });
        }
        match open.lamp.IsEnabled() {
            Ok(enabled) => Some(TorchNotification::ModeChanged {
                device: open.device.clone(),
                enabled,
            }),
            Err(err) => {
                tracing::warn!(error = %err, "could not read lamp state");
                None
            }
        }
    }
}

fn unknown(err: windows::core::Error) -> TorchError {
    TorchError::Unknown(err.message().to_string())
}

fn map_set_error(device: &DeviceId, err: windows::core::Error) -> TorchError {
    if BUSY_HRESULTS.contains(&err.code()) {
        TorchError::DeviceBusy {
            device: device.clone(),
        }
    } else {
        unknown(err)
    }
}

impl TorchBackend for LampTorch {
    fn torch_devices(&self) -> Result<Vec<DeviceId>, TorchError> {
        Ok(self
            .lamp
            .iter()
            .map(|open| open.device.clone())
            .collect())
    }

    fn set_torch_mode(&self, device: &DeviceId, enabled: bool) -> Result<(), TorchError> {
        let lamp = self.lamp_for(device)?;
        if !lock(&self.shared).available {
            return Err(TorchError::DeviceBusy {
                device: device.clone(),
            });
        }

        lamp.SetIsEnabled(enabled)
            .map_err(|e| map_set_error(device, e))?;
        let confirmed = lamp.IsEnabled().map_err(|e| map_set_error(device, e))?;

        dispatch(
            &self.shared,
            TorchNotification::ModeChanged {
                device: device.clone(),
                enabled: confirmed,
            },
        );
        Ok(())
    }

    fn register_callback(&self, callback: TorchCallback) -> Result<CallbackId, TorchError> {
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.shared)
            .callbacks
            .push((id, Arc::clone(&callback)));

        if let Some(notification) = self.current_notification() {
            callback(notification);
        }
        Ok(id)
    }

    fn unregister_callback(&self, id: CallbackId) {
        lock(&self.shared).callbacks.retain(|(cb_id, _)| *cb_id != id);
    }
}

impl Drop for LampTorch {
    fn drop(&mut self) {
        if let Some(open) = self.lamp.take() {
            if let Err(err) = open.lamp.RemoveAvailabilityChanged(open.token) {
                tracing::debug!(error = %err, "failed to remove availability handler");
            }
            if let Err(err) = open.lamp.Close() {
                tracing::debug!(error = %err, "failed to close lamp");
            }
        }
    }
}
