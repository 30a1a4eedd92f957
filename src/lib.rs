//! Client for the smart home outlets of a FRITZ!Box, using the "AVM Home
//! Automation" HTTP interface
//! <https://avm.de/fileadmin/user_upload/Global/Service/Schnittstellen/AHA-HTTP-Interface.pdf>.
//!
//! It is used by the `fritzswitch` command line utility.
//!
//! ## Example
//!
//! ```no_run
//! use fritz_switch::{ClientConfig, Credentials, FritzClient};
//!
//! # fn main() -> fritz_switch::Result<()> {
//! let config = ClientConfig::with_host("fritz.box");
//! let client = FritzClient::new(&config, Credentials::new("user", "password"))?;
//!
//! // Logs in on first use and lists all outlets, sorted by name.
//! for device in client.list_devices()?.iter() {
//!     println!("{device}");
//! }
//!
//! // If the first outlet is off, turn it on.
//! if let Some(dev) = client.devices().first().filter(|dev| !dev.is_on()) {
//!     client.turn_on(dev.id())?;
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub(crate) mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod devices;
pub mod digest;
pub mod directory;
pub mod error;
pub mod fritz_xml;
pub mod session;
pub mod transport;

pub use client::FritzClient;
pub use commands::{SwitchAction, SwitchOutcome};
pub use config::{ClientConfig, Credentials};
pub use devices::{capability, Device, SwitchMode, SwitchState};
pub use directory::DeviceDirectory;
pub use error::{FritzError, Result};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionState, SessionStore};
pub use transport::{HttpTransport, Transport};
