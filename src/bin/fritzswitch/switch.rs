use fritz_switch::{FritzClient, SwitchAction};

pub(crate) fn switch(client: &FritzClient, ain: &str, action: SwitchAction) -> anyhow::Result<()> {
    let devices = client.list_devices()?;
    let device = match devices.iter().find(|dev| dev.id() == ain) {
        None => {
            return Err(anyhow::anyhow!("Cannot find device with ain {:?}", ain));
        }
        Some(device) => device,
    };

    let outcome = client.switch(device.id(), action)?;
    println!(
        "{} ({}) is now {}",
        device.name,
        outcome.ain,
        if outcome.is_on { "on" } else { "off" }
    );
    Ok(())
}
