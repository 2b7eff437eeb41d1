use anyhow::Result;
use splmeter::audio;

/// Comma-separated device names from `SPLMETER_TEST_DEVICES`, blanks dropped.
fn parse_device_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

pub(crate) fn list_input_devices() -> Result<()> {
    // SPLMETER_TEST_DEVICES stands in for the host so tests need no hardware.
    let devices = if let Ok(raw) = std::env::var("SPLMETER_TEST_DEVICES") {
        parse_device_list(&raw)
    } else {
        audio::Recorder::list_devices().unwrap_or_else(|err| {
            eprintln!("Failed to list audio input devices: {err}");
            Vec::new()
        })
    };

    if devices.is_empty() {
        println!("No audio input devices detected.");
    } else {
        println!("Available audio input devices:");
        for name in devices {
            println!("  - {name}");
        }
    }
    Ok(())
}
