use crate::error::Result;
use crate::transport::Transport;

pub const LOGIN_PATH: &str = "/login_sid.lua";
pub const HOMEAUTO_PATH: &str = "/webservices/homeautoswitch.lua";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Commands {
    GetDeviceListInfos,
    SetSwitchOff { ain: String },
    SetSwitchOn { ain: String },
    SetSwitchToggle { ain: String },
}

impl Commands {
    pub(crate) fn name(&self) -> &'static str {
        use Commands::*;
        match self {
            GetDeviceListInfos => "getdevicelistinfos",
            SetSwitchOff { .. } => "setswitchoff",
            SetSwitchOn { .. } => "setswitchon",
            SetSwitchToggle { .. } => "setswitchtoggle",
        }
    }

    pub(crate) fn ain(&self) -> Option<&str> {
        use Commands::*;
        match self {
            GetDeviceListInfos => None,
            SetSwitchOff { ain } | SetSwitchOn { ain } | SetSwitchToggle { ain } => Some(ain),
        }
    }
}

/// Sends a raw homeautoswitch command to the fritz box.
pub(crate) fn request(transport: &dyn Transport, cmd: &Commands, sid: &str) -> Result<String> {
    let name = cmd.name();
    let mut query = vec![("switchcmd", name), ("sid", sid)];
    if let Some(ain) = cmd.ain() {
        query.push(("ain", ain));
    }
    let result = transport.get(HOMEAUTO_PATH, &query);
    if let Err(err) = &result {
        debug!("[fritz api] {} failed: {}", name, err);
    }
    result
}
