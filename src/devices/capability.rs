//! Bits of the `functionbitmask` attribute of a device.

pub const HANFUN_DEVICE: u32 = 1 << 0;
pub const LIGHT: u32 = 1 << 2;
pub const ALARM_SENSOR: u32 = 1 << 4;
pub const AVM_BUTTON: u32 = 1 << 5;
pub const THERMOSTAT: u32 = 1 << 6;
pub const POWER_METER: u32 = 1 << 7;
pub const TEMPERATURE_SENSOR: u32 = 1 << 8;
pub const OUTLET_SWITCH: u32 = 1 << 9;
pub const DECT_REPEATER: u32 = 1 << 10;
pub const MICROPHONE: u32 = 1 << 11;
pub const HANFUN_UNIT: u32 = 1 << 13;
pub const SWITCHABLE_ACTOR: u32 = 1 << 15;
pub const DIMMABLE: u32 = 1 << 16;
pub const COLOR_LAMP: u32 = 1 << 17;

const NAMES: [(u32, &str); 14] = [
    (HANFUN_DEVICE, "hanfun-device"),
    (LIGHT, "light"),
    (ALARM_SENSOR, "alarm"),
    (AVM_BUTTON, "button"),
    (THERMOSTAT, "thermostat"),
    (POWER_METER, "power-meter"),
    (TEMPERATURE_SENSOR, "temperature"),
    (OUTLET_SWITCH, "outlet"),
    (DECT_REPEATER, "repeater"),
    (MICROPHONE, "microphone"),
    (HANFUN_UNIT, "hanfun-unit"),
    (SWITCHABLE_ACTOR, "switchable"),
    (DIMMABLE, "dimmable"),
    (COLOR_LAMP, "color"),
];

pub fn has_capability(mask: u32, bit: u32) -> bool {
    mask & bit == bit
}

/// Names of all capabilities set in `mask`, in bit order.
pub fn names(mask: u32) -> Vec<&'static str> {
    NAMES
        .iter()
        .filter(|(bit, _)| has_capability(mask, *bit))
        .map(|(_, name)| *name)
        .collect()
}
