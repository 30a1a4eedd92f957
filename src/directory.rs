use std::sync::Arc;

use parking_lot::RwLock;

use crate::api::{self, Commands};
use crate::commands::SwitchOutcome;
use crate::devices::{self, Device};
use crate::error::{FritzError, Result};
use crate::fritz_xml;
use crate::transport::Transport;

/// Requests the device list and returns the sorted, switchable devices.
///
/// The fritz box answers with an empty body (newer firmware: 403) when the
/// sid is no longer valid. Both are reported as
/// [`FritzError::ReauthenticationRequired`] instead of an empty list.
pub fn fetch(transport: &dyn Transport, sid: &str) -> Result<Vec<Device>> {
    let xml = match api::request(transport, &Commands::GetDeviceListInfos, sid) {
        Err(err) if err.needs_reauthentication() => {
            return Err(FritzError::ReauthenticationRequired)
        }
        result => result?,
    };
    let list = fritz_xml::parse_device_list(&xml)?;
    let total = list.devices.len();
    let devices = devices::switchable(list.devices);
    debug!("found {} devices, {} switchable", total, devices.len());
    Ok(devices)
}

/// The last known list of switchable devices.
///
/// Readers get the whole list behind an [`Arc`]; updates build a new list and
/// swap it in, so nobody sees a half updated list.
#[derive(Debug, Default)]
pub struct DeviceDirectory {
    snapshot: RwLock<Arc<Vec<Device>>>,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<Vec<Device>> {
        self.snapshot.read().clone()
    }

    pub fn get(&self, ain: &str) -> Option<Device> {
        self.snapshot.read().iter().find(|dev| dev.id() == ain).cloned()
    }

    /// Fetches the device list and replaces the snapshot. The old snapshot
    /// stays in place if the fetch fails.
    pub fn refresh(&self, transport: &dyn Transport, sid: &str) -> Result<Arc<Vec<Device>>> {
        let devices = fetch(transport, sid)?;
        Ok(self.replace(devices))
    }

    pub fn replace(&self, mut devices: Vec<Device>) -> Arc<Vec<Device>> {
        devices::sort_by_name(&mut devices);
        let devices = Arc::new(devices);
        *self.snapshot.write() = devices.clone();
        devices
    }

    /// Takes over a switch state confirmed by the fritz box. Returns false if
    /// the device is not in the snapshot.
    pub fn apply(&self, outcome: &SwitchOutcome) -> bool {
        let mut snapshot = self.snapshot.write();
        if !snapshot.iter().any(|dev| dev.id() == outcome.ain) {
            return false;
        }
        let mut devices = snapshot.as_ref().clone();
        for dev in devices.iter_mut().filter(|dev| dev.id() == outcome.ain) {
            dev.set_on(outcome.is_on);
        }
        *snapshot = Arc::new(devices);
        true
    }
}
