use crate::fritz_xml as xml;

pub mod capability;
use capability::{has_capability, OUTLET_SWITCH, POWER_METER, TEMPERATURE_SENSOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchMode {
    Auto,
    /// Spelled "manuell" by the fritz box.
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchState {
    pub on: bool,
    pub mode: Option<SwitchMode>,
    /// Switching via the web ui / api is locked.
    pub lock: Option<bool>,
    /// Switching via the button on the device is locked.
    pub device_lock: Option<bool>,
}

/// A smart home device as reported by `getdevicelistinfos`. Measurements are
/// already converted to °C, W, kWh and V.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// The AIN.
    pub identifier: String,
    pub name: String,
    pub function_bitmask: u32,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    pub firmware_version: Option<String>,
    pub present: Option<bool>,
    pub switch: Option<SwitchState>,
    pub celsius: Option<f64>,
    pub power_watts: Option<f64>,
    pub energy_kwh: Option<f64>,
    pub voltage: Option<f64>,
}

impl Device {
    /// Maps a raw device. Returns `None` if identifier or name is missing.
    pub fn from_xml_device(device: xml::Device) -> Option<Self> {
        let identifier = trimmed(device.identifier)?;
        let name = trimmed(device.name)?;
        let function_bitmask = device
            .functionbitmask
            .as_deref()
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or_default();
        let has = |bit| has_capability(function_bitmask, bit);

        let switch = device
            .switch
            .filter(|_| has(OUTLET_SWITCH))
            .and_then(switch_state);

        let (celsius, power_watts, energy_kwh, voltage) = {
            let celsius = device
                .temperature
                .filter(|_| has(TEMPERATURE_SENSOR))
                .and_then(|t| scaled(t.celsius, 10.0));
            match device.powermeter.filter(|_| has(POWER_METER)) {
                Some(meter) => (
                    celsius,
                    scaled(meter.power, 1000.0),
                    scaled(meter.energy, 1000.0),
                    scaled(meter.voltage, 1000.0),
                ),
                None => (celsius, None, None, None),
            }
        };

        Some(Device {
            identifier,
            name,
            function_bitmask,
            manufacturer: trimmed(device.manufacturer),
            product_name: trimmed(device.productname),
            firmware_version: trimmed(device.fwversion),
            present: flag(device.present.as_deref()),
            switch,
            celsius,
            power_watts,
            energy_kwh,
            voltage,
        })
    }

    pub fn id(&self) -> &str {
        &self.identifier
    }

    pub fn has_capability(&self, bit: u32) -> bool {
        has_capability(self.function_bitmask, bit)
    }

    /// Outlets with a readable switch state. Outlets whose `<switch>` is
    /// missing or reports no state are treated as defective.
    pub fn is_switchable(&self) -> bool {
        self.has_capability(OUTLET_SWITCH) && self.switch.is_some()
    }

    pub fn is_on(&self) -> bool {
        self.switch.as_ref().map(|s| s.on).unwrap_or(false)
    }

    pub fn state(&self) -> &str {
        match &self.switch {
            Some(SwitchState { on: true, .. }) => "on",
            Some(SwitchState { on: false, .. }) => "off",
            None => "",
        }
    }

    pub(crate) fn set_on(&mut self, on: bool) {
        if let Some(switch) = self.switch.as_mut() {
            switch.on = on;
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "identifier={:?} productname={:?} name={:?} state={:?}",
            self.identifier,
            self.product_name.as_deref().unwrap_or_default(),
            self.name,
            self.state()
        )
    }
}

/// Maps raw devices, drops everything that is not a working outlet and sorts
/// by name. Names compare byte-wise (case-sensitive), equal names by
/// identifier, so the order does not depend on the order of the response.
pub fn switchable(devices: Vec<xml::Device>) -> Vec<Device> {
    let mut result: Vec<Device> = devices
        .into_iter()
        .filter_map(|raw| {
            let device = Device::from_xml_device(raw);
            if device.is_none() {
                warn!("skipping device without identifier or name");
            }
            device
        })
        .filter(|device| {
            if device.has_capability(OUTLET_SWITCH) && device.switch.is_none() {
                debug!("skipping outlet {} without switch state", device.identifier);
            }
            device.is_switchable()
        })
        .collect();
    sort_by_name(&mut result);
    result
}

pub fn sort_by_name(devices: &mut [Device]) {
    devices.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

fn trimmed(val: Option<String>) -> Option<String> {
    val.map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

/// Parses a raw value and divides it by `divisor`, e.g. 1000 for mW -> W.
fn scaled(val: Option<String>, divisor: f64) -> Option<f64> {
    val.and_then(|val| val.trim().parse::<f64>().ok())
        .filter(|val| val.is_finite())
        .map(|val| val / divisor)
}

fn flag(val: Option<&str>) -> Option<bool> {
    match val.map(str::trim) {
        Some("1") => Some(true),
        Some("0") => Some(false),
        _ => None,
    }
}

fn switch_state(switch: xml::Switch) -> Option<SwitchState> {
    let on = flag(switch.state.as_deref())?;
    let mode = match switch.mode.as_deref().map(str::trim) {
        Some("auto") => Some(SwitchMode::Auto),
        Some("manuell") => Some(SwitchMode::Manual),
        _ => None,
    };
    Some(SwitchState {
        on,
        mode,
        lock: flag(switch.lock.as_deref()),
        device_lock: flag(switch.devicelock.as_deref()),
    })
}
