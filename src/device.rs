//! Device enumeration and the evdev-backed device handle.
//!
//! Reads input events directly from `/dev/input/event*` nodes. Access
//! usually requires root or membership in the `input` group:
//!
//! ```bash
//! sudo usermod -aG input $USER
//! # Then log out and back in
//! ```

use crate::error::{Error, Result};
use evdev::{Device, InputEvent};
use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Directory the kernel exposes input device nodes in.
pub const INPUT_DIR: &str = "/dev/input";

/// How long a single poll waits before the stop flag is checked again.
const POLL_TIMEOUT_MS: libc::c_int = 100;

/// Read-only snapshot of a device, used for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Path of the device node.
    pub path: PathBuf,
    /// Name reported by the driver.
    pub name: String,
    /// Physical (bus) location reported by the driver.
    pub phys: String,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\" ({})", self.path.display(), self.name, self.phys)
    }
}

/// Something that can describe itself for the selection prompt.
pub trait Described {
    fn info(&self) -> &DeviceInfo;
}

/// A source of input events.
///
/// `next_event` blocks until an event is available. It only returns an
/// error when the source can produce no more events.
pub trait EventSource {
    fn next_event(&mut self) -> Result<InputEvent>;
}

/// An open `/dev/input/event*` node.
///
/// The underlying file descriptor is closed (and any grab released) when
/// the handle is dropped.
pub struct EvdevDevice {
    info: DeviceInfo,
    device: Device,
    pending: VecDeque<InputEvent>,
    running: Arc<AtomicBool>,
    grabbed: bool,
}

impl EvdevDevice {
    /// Open the device node at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let device = Device::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let info = DeviceInfo {
            path: path.to_path_buf(),
            name: device.name().unwrap_or_default().to_string(),
            phys: device.physical_path().unwrap_or_default().to_string(),
        };
        log::debug!("opened {}", info);

        Ok(Self {
            info,
            device,
            pending: VecDeque::new(),
            running: Arc::new(AtomicBool::new(true)),
            grabbed: false,
        })
    }

    /// Share a stop flag with the handle. Once the flag is cleared,
    /// `next_event` returns [`Error::Interrupted`].
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Take exclusive access so no other client receives this device's events.
    pub fn grab(&mut self) -> Result<()> {
        self.device.grab().map_err(|source| Error::Grab {
            path: self.info.path.clone(),
            source,
        })?;
        self.grabbed = true;
        log::info!("grabbed {}", self.info.path.display());
        Ok(())
    }

    /// Wait up to one poll slice for the device to become readable.
    fn wait_readable(&self) -> Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };

        let ret = unsafe { libc::poll(&mut pfd, 1, POLL_TIMEOUT_MS) };
        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(Error::Read {
                path: self.info.path.clone(),
                source: err,
            });
        }

        // POLLHUP/POLLERR also count: the following read reports the failure.
        Ok(ret > 0 && pfd.revents != 0)
    }
}

impl Described for EvdevDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }
}

impl EventSource for EvdevDevice {
    fn next_event(&mut self) -> Result<InputEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(event);
            }

            if !self.running.load(Ordering::SeqCst) {
                return Err(Error::Interrupted);
            }

            if !self.wait_readable()? {
                continue;
            }

            let events = self.device.fetch_events().map_err(|source| Error::Read {
                path: self.info.path.clone(),
                source,
            })?;
            self.pending.extend(events);
        }
    }
}

impl Drop for EvdevDevice {
    fn drop(&mut self) {
        if self.grabbed {
            if let Err(e) = self.device.ungrab() {
                log::debug!("failed to ungrab {}: {}", self.info.path.display(), e);
            }
        }
        log::debug!("closing {}", self.info.path.display());
    }
}

/// Numeric suffix of an `eventN` node name.
fn event_node_index(name: &str) -> Option<u32> {
    name.strip_prefix("event")?.parse().ok()
}

/// Keep the `eventN` paths and order them by their number.
fn order_event_nodes(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut nodes: Vec<(u32, PathBuf)> = paths
        .into_iter()
        .filter_map(|path| {
            let index = event_node_index(&path.file_name()?.to_string_lossy())?;
            Some((index, path))
        })
        .collect();
    nodes.sort_by_key(|(index, _)| *index);

    nodes.into_iter().map(|(_, path)| path).collect()
}

/// List `event*` character-device nodes in `dir`, ordered by their number.
pub fn list_devices_in(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| Error::Enumeration {
        path: dir.to_path_buf(),
        source,
    })?;

    let char_devices = entries.flatten().filter_map(|entry| {
        let file_type = entry.file_type().ok()?;
        file_type.is_char_device().then(|| entry.path())
    });

    Ok(order_event_nodes(char_devices))
}

/// List the input device nodes on this system.
pub fn list_devices() -> Result<Vec<PathBuf>> {
    list_devices_in(INPUT_DIR)
}

/// Open every listed device. Nodes that cannot be opened are skipped.
pub fn enumerate_devices() -> Result<Vec<EvdevDevice>> {
    let devices: Vec<EvdevDevice> = list_devices()?
        .into_iter()
        .filter_map(|path| match EvdevDevice::open(&path) {
            Ok(device) => Some(device),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        })
        .collect();

    if devices.is_empty() {
        log::warn!(
            "no input devices accessible. Make sure you're in the 'input' group: \
             sudo usermod -aG input $USER"
        );
    }

    Ok(devices)
}
