use serde::Deserialize;
use serde_xml_rs::{from_reader, Deserializer};

use crate::error::Result;

// Every field is optional: a missing element is a normal answer of the fritz
// box, not a parse error. Callers decide what absence means.

// response of login_sid.lua

#[derive(Debug, Default, Deserialize)]
pub struct SessionInfo {
    #[serde(rename = "SID")]
    pub sid: Option<String>,
    #[serde(rename = "Challenge")]
    pub challenge: Option<String>,
    #[serde(rename = "BlockTime")]
    pub block_time: Option<String>,
}

impl SessionInfo {
    pub fn challenge(&self) -> Option<&str> {
        non_empty(&self.challenge)
    }

    pub fn sid(&self) -> Option<&str> {
        non_empty(&self.sid)
    }

    /// Seconds the fritz box refuses further login attempts, 0 if it doesn't.
    pub fn block_time(&self) -> u32 {
        self.block_time
            .as_deref()
            .and_then(|val| val.trim().parse().ok())
            .unwrap_or_default()
    }
}

// response of getdevicelistinfos

#[derive(Debug, Default, Deserialize)]
pub struct DeviceList {
    #[serde(rename = "device", default)]
    pub devices: Vec<Device>,
}

/// `functionbitmask`, `identifier`, `manufacturer`, `productname` and
/// `fwversion` are attributes of `<device>`, the rest are child elements.
#[derive(Debug, Default, Deserialize)]
pub struct Device {
    pub identifier: Option<String>,
    pub functionbitmask: Option<String>,
    pub fwversion: Option<String>,
    pub manufacturer: Option<String>,
    pub productname: Option<String>,
    pub name: Option<String>,
    pub present: Option<String>,
    pub switch: Option<Switch>,
    pub powermeter: Option<PowerMeter>,
    pub temperature: Option<Temperature>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Switch {
    /// 0/1, empty if unknown
    pub state: Option<String>,
    /// "auto" or "manuell"
    pub mode: Option<String>,
    pub lock: Option<String>,
    pub devicelock: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PowerMeter {
    /// Wert in 0,001 V (aktuelle Spannung, wird etwa alle 2 Minuten aktualisiert)
    pub voltage: Option<String>,
    /// Wert in 0,001 W (aktuelle Leistung, wird etwa alle 2 Minuten aktualisiert)
    pub power: Option<String>,
    /// Wert in 1.0 Wh (absoluter Verbrauch seit Inbetriebnahme)
    pub energy: Option<String>,
}

/// celsius: Wert in 0,1 °C, negative und positive Werte möglich
/// offset: Wert in 0,1 °C, negative und positive Werte möglich
#[derive(Debug, Default, Deserialize)]
pub struct Temperature {
    pub celsius: Option<String>,
    pub offset: Option<String>,
}

fn non_empty(val: &Option<String>) -> Option<&str> {
    val.as_deref().map(str::trim).filter(|val| !val.is_empty())
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

pub fn parse_session_info(xml: &str) -> Result<SessionInfo> {
    from_reader(xml.trim().as_bytes()).map_err(|err| {
        debug!("cannot parse session info: {err}");
        err.into()
    })
}

/// Parses raw [`Device`]s. `<device>` elements don't have to be adjacent,
/// `<group>`s and other siblings in between are skipped.
pub fn parse_device_list(xml: &str) -> Result<DeviceList> {
    let mut de =
        Deserializer::new_from_reader(xml.trim().as_bytes()).non_contiguous_seq_elements(true);
    DeviceList::deserialize(&mut de).map_err(|err| {
        debug!("cannot parse device infos: {err}");
        err.into()
    })
}

#[cfg(test)]
mod tests {
    use crate::error::FritzError;

    #[test]
    fn parse_session_info() {
        let xml = r##"
<?xml version="1.0" encoding="utf-8"?>
<SessionInfo>
  <SID>0000000000000000</SID>
  <Challenge>63233c3d</Challenge>
  <BlockTime>0</BlockTime>
  <Rights></Rights>
</SessionInfo>
"##;

        let info = super::parse_session_info(xml).unwrap();
        assert_eq!(info.block_time(), 0);
        assert_eq!(info.challenge(), Some("63233c3d"));
        assert_eq!(info.sid(), Some("0000000000000000"));
    }

    #[test]
    fn missing_challenge_is_absent_not_error() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?><SessionInfo><SID>0000000000000000</SID><BlockTime>12</BlockTime></SessionInfo>"#;
        let info = super::parse_session_info(xml).unwrap();
        assert_eq!(info.challenge(), None);
        assert_eq!(info.block_time(), 12);
    }

    #[test]
    fn malformed_xml_is_parse_failure() {
        let err = super::parse_session_info("<SessionInfo><SID>123</Challenge>").unwrap_err();
        assert!(matches!(err, FritzError::ParseFailure(_)), "{err:?}");
    }

    #[test]
    fn parse_device_list() {
        let xml = r#"<devicelist version="1" fwversion="7.29">
<device identifier="11657 0272633" id="16" functionbitmask="35712" fwversion="04.16" manufacturer="AVM" productname="FRITZ!DECT 200">
  <present>1</present>
  <txbusy>0</txbusy>
  <name>Lampe</name>
  <switch><state>1</state><mode>manuell</mode><lock>0</lock><devicelock>0</devicelock></switch>
  <simpleonoff><state>1</state></simpleonoff>
  <powermeter><voltage>229978</voltage><power>4560</power><energy>12345</energy></powermeter>
  <temperature><celsius>215</celsius><offset>0</offset></temperature>
</device>
<device identifier="09995 0335100" id="17" functionbitmask="320" fwversion="04.94" manufacturer="AVM" productname="FRITZ!DECT 301">
  <present>1</present>
  <name>Heizung</name>
  <temperature><celsius>195</celsius><offset>-5</offset></temperature>
</device>
</devicelist>"#;

        let list = super::parse_device_list(xml).unwrap();
        assert_eq!(list.devices.len(), 2);

        let lamp = &list.devices[0];
        assert_eq!(lamp.identifier.as_deref(), Some("11657 0272633"));
        assert_eq!(lamp.functionbitmask.as_deref(), Some("35712"));
        assert_eq!(lamp.name.as_deref(), Some("Lampe"));
        assert_eq!(
            lamp.switch.as_ref().and_then(|s| s.state.as_deref()),
            Some("1")
        );
        assert_eq!(
            lamp.powermeter.as_ref().and_then(|p| p.power.as_deref()),
            Some("4560")
        );

        let heater = &list.devices[1];
        assert!(heater.switch.is_none());
        assert!(heater.powermeter.is_none());
    }

    #[test]
    fn groups_between_devices() {
        let xml = r#"<devicelist version="1">
<device identifier="1" functionbitmask="35712"><name>A</name></device>
<device identifier="2" functionbitmask="35712"><name>B</name></device>
<group identifier="grp1" id="900" functionbitmask="6784"><present>1</present><name>Gruppe</name>
  <switch><state>1</state></switch>
  <groupinfo><masterdeviceid>0</masterdeviceid><members>16,17</members></groupinfo>
</group>
<device identifier="3" functionbitmask="35712"><name>C</name></device>
</devicelist>"#;

        let list = super::parse_device_list(xml).unwrap();
        let ids: Vec<_> = list
            .devices
            .iter()
            .map(|dev| dev.identifier.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
