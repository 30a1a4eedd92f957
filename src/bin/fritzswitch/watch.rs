use std::sync::Arc;
use std::time::Duration;

use fritz_switch::{Device, FritzClient};

/// Polls forever. Failed polls are logged and retried on the next tick.
pub(crate) fn watch(
    client: &FritzClient,
    interval: Duration,
    capabilities: bool,
) -> anyhow::Result<()> {
    info!("polling every {:?}", interval);
    let mut last: Option<Arc<Vec<Device>>> = None;
    loop {
        match client.list_devices() {
            Ok(devices) => {
                if changed(last.as_deref(), &devices) {
                    println!("{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
                    crate::list::device_table(&devices, capabilities).printstd();
                    last = Some(devices);
                }
            }
            Err(err) => error!("cannot list devices: {err}"),
        }
        std::thread::sleep(interval);
    }
}

fn changed(last: Option<&Vec<Device>>, current: &[Device]) -> bool {
    last.map(|last| last.as_slice() != current).unwrap_or(true)
}
