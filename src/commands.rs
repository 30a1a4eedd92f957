use crate::api::{self, Commands};
use crate::error::{FritzError, Result};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchAction {
    On,
    Off,
    Toggle,
}

impl SwitchAction {
    fn command(self, ain: &str) -> Commands {
        let ain = ain.to_string();
        match self {
            SwitchAction::On => Commands::SetSwitchOn { ain },
            SwitchAction::Off => Commands::SetSwitchOff { ain },
            SwitchAction::Toggle => Commands::SetSwitchToggle { ain },
        }
    }
}

/// The switch state the fritz box reported back after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub ain: String,
    pub is_on: bool,
}

/// Flips the outlet `ain`. Not idempotent, so never retried.
pub fn toggle(transport: &dyn Transport, sid: &str, ain: &str) -> Result<SwitchOutcome> {
    switch(transport, sid, ain, SwitchAction::Toggle)
}

pub fn turn_on(transport: &dyn Transport, sid: &str, ain: &str) -> Result<SwitchOutcome> {
    switch(transport, sid, ain, SwitchAction::On)
}

pub fn turn_off(transport: &dyn Transport, sid: &str, ain: &str) -> Result<SwitchOutcome> {
    switch(transport, sid, ain, SwitchAction::Off)
}

/// Sends `action` for `ain` and parses the `1`/`0` answer. Errors carry the
/// device identifier.
pub fn switch(
    transport: &dyn Transport,
    sid: &str,
    ain: &str,
    action: SwitchAction,
) -> Result<SwitchOutcome> {
    let cmd = action.command(ain);
    let is_on = api::request(transport, &cmd, sid)
        .and_then(|body| parse_switch_response(cmd.name(), &body))
        .map_err(|err| err.for_device(ain))?;
    debug!("{} {} -> {}", cmd.name(), ain, if is_on { "on" } else { "off" });
    Ok(SwitchOutcome {
        ain: ain.to_string(),
        is_on,
    })
}

fn parse_switch_response(context: &str, body: &str) -> Result<bool> {
    match body.trim().parse::<u8>() {
        Ok(val) => Ok(val == 1),
        Err(_) => Err(FritzError::UnexpectedResponse {
            context: context.to_string(),
            response: body.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HOMEAUTO_PATH;
    use crate::transport::testing::FakeTransport;

    const AIN: &str = "08761 0000434";

    fn answering(body: &'static str) -> FakeTransport {
        FakeTransport::new(move |_, _| Ok(body.to_string()))
    }

    #[test]
    fn toggle_reports_new_state() {
        let on = toggle(&answering("1\n"), "abc", AIN).unwrap();
        assert_eq!(
            on,
            SwitchOutcome {
                ain: AIN.to_string(),
                is_on: true
            }
        );
        let off = toggle(&answering("0\n"), "abc", AIN).unwrap();
        assert!(!off.is_on);
    }

    #[test]
    fn other_numbers_are_off() {
        assert!(!toggle(&answering("2"), "abc", AIN).unwrap().is_on);
    }

    #[test]
    fn gibberish_is_unexpected_response_with_ain() {
        let err = toggle(&answering("gibberish"), "abc", AIN).unwrap_err();
        assert_eq!(err.ain(), Some(AIN));
        match err {
            FritzError::Device { source, .. } => match *source {
                FritzError::UnexpectedResponse { context, response } => {
                    assert_eq!(context, "setswitchtoggle");
                    assert_eq!(response, "gibberish");
                }
                other => panic!("unexpected error {other:?}"),
            },
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn sends_command_for_action() {
        let transport = answering("1");
        let calls = transport.calls.clone();
        turn_on(&transport, "abc", AIN).unwrap();
        turn_off(&transport, "abc", AIN).unwrap();
        toggle(&transport, "abc", AIN).unwrap();

        let calls = calls.lock();
        let cmds: Vec<_> = calls.iter().map(|(_, q)| q["switchcmd"].as_str()).collect();
        assert_eq!(cmds, vec!["setswitchon", "setswitchoff", "setswitchtoggle"]);
        assert!(calls
            .iter()
            .all(|(path, q)| path == HOMEAUTO_PATH && q["ain"] == AIN && q["sid"] == "abc"));
    }

    #[test]
    fn empty_response_stays_reauth_trigger() {
        let transport = FakeTransport::new(|_, _| Err(FritzError::EmptyResponse));
        let err = toggle(&transport, "abc", AIN).unwrap_err();
        assert_eq!(err.ain(), Some(AIN));
        assert!(err.needs_reauthentication());
    }
}
