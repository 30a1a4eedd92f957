use fritz_switch::{capability, Device, FritzClient};
use prettytable::{format, Cell, Row, Table};

pub(crate) fn list(client: &FritzClient, capabilities: bool) -> anyhow::Result<()> {
    let devices = client.list_devices()?;
    info!("found {} devices", devices.len());
    device_table(&devices, capabilities).printstd();
    Ok(())
}

fn create_table() -> Table {
    let mut table = Table::new();
    let fmt = format::FormatBuilder::new()
        .padding(1, 1)
        .separator(
            format::LinePosition::Title,
            format::LineSeparator::new('-', '+', '+', '+'),
        )
        .column_separator('|')
        .build();
    table.set_format(fmt);
    table
}

pub(crate) fn device_table(devices: &[Device], capabilities: bool) -> Table {
    let mut table = create_table();
    let mut titles = vec![
        "ain", "name", "product", "state", "temp", "power", "energy", "voltage",
    ];
    if capabilities {
        titles.push("capabilities");
    }
    table.set_titles(Row::new(
        titles
            .into_iter()
            .map(|title| Cell::new_align(title, format::Alignment::CENTER))
            .collect(),
    ));

    for device in devices {
        let mut cells = vec![
            Cell::new(device.id()),
            Cell::new(&device.name),
            Cell::new(device.product_name.as_deref().unwrap_or_default()),
            Cell::new(device.state()),
            measurement(device.celsius, 1, "°C"),
            measurement(device.power_watts, 2, "W"),
            measurement(device.energy_kwh, 3, "kWh"),
            measurement(device.voltage, 1, "V"),
        ];
        if capabilities {
            cells.push(Cell::new(
                &capability::names(device.function_bitmask).join(", "),
            ));
        }
        table.add_row(Row::new(cells));
    }
    table
}

fn measurement(val: Option<f64>, precision: usize, unit: &str) -> Cell {
    let text = val
        .map(|val| format!("{val:.precision$} {unit}"))
        .unwrap_or_default();
    Cell::new_align(&text, format::Alignment::RIGHT)
}
