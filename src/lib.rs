//! # rawev
//!
//! Display raw input events from Linux `/dev/input/event*` devices.
//!
//! The crate is split the same way the `rawev` binary runs:
//!
//! - [`device`] lists and opens device nodes and wraps them as an [`EventSource`]
//! - [`select`] asks the user to pick one of the enumerated devices
//! - [`printer`] reads events forever and prints the ones with a non-zero code
//! - [`categorize`] turns a raw `(type, code, value)` into a readable label
//!
//! ## Example
//!
//! ```no_run
//! use rawev::{EvdevDevice, print_events};
//!
//! let mut device = EvdevDevice::open("/dev/input/event0").expect("Failed to open device");
//! let err = print_events(&mut device, &mut std::io::stdout()).unwrap_err();
//! eprintln!("stopped: {}", err);
//! ```

#[cfg(not(target_os = "linux"))]
compile_error!("rawev reads evdev nodes and only supports Linux");

pub mod categorize;
pub mod device;
pub mod error;
pub mod printer;
pub mod select;

// Re-exports
pub use categorize::{Categorized, Category, KeyState, categorize};
pub use device::{
    DeviceInfo, Described, EvdevDevice, EventSource, enumerate_devices, list_devices,
};
pub use error::{Error, Result, SelectionError};
pub use printer::print_events;
pub use select::select_device;
