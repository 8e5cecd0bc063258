// Jaguar diagnostic: READ-ONLY check of a controller on the serial link
//
// This tool only sends queries - no set-points, no enables, no movement.
//
// Usage: cargo run --example jaguar_diagnostic -- [port] [device...]
// Example: cargo run --example jaguar_diagnostic -- /dev/ttyUSB0 1 2

use jaguar_serial::config::{DEFAULT_PORT, LinkConfig};
use jaguar_serial::JaguarDriver;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let port = args.next().unwrap_or_else(|| DEFAULT_PORT.to_string());
    let devices: Vec<u8> = args.map(|a| a.parse()).collect::<Result<_, _>>()?;
    let devices = if devices.is_empty() { vec![1] } else { devices };

    println!("Jaguar diagnostic (read-only)");
    println!("Serial port: {}", port);
    println!("Devices:     {:?}", devices);
    println!();

    println!("Step 1: Opening serial port...");
    let config = LinkConfig {
        port: port.clone(),
        ..LinkConfig::default()
    };
    let mut driver = match JaguarDriver::open(&config) {
        Ok(driver) => {
            println!("  ✓ Serial port opened");
            driver
        }
        Err(e) => {
            println!("  ✗ Failed to open serial port: {}", e);
            println!();
            println!("Troubleshooting:");
            println!("  - Check the port path is correct");
            println!("  - Verify the RS232 adapter and the Jaguar's serial jumper");
            return Err(e.into());
        }
    };
    println!();

    println!("Step 2: Reading firmware versions...");
    let mut responding = Vec::new();
    for &device in &devices {
        match driver.firmware_version(device) {
            Ok(version) => {
                println!("  Device {}: ✓ firmware {}", device, version);
                responding.push(device);
            }
            Err(e) if e.is_transport() => println!("  Device {}: ✗ no response ({})", device, e),
            Err(e) => println!("  Device {}: ✗ bad response ({})", device, e),
        }
    }
    println!();

    println!("Step 3: Reading status...");
    for &device in &responding {
        println!("  === Device {} ===", device);
        match driver.read_status(device) {
            Ok(report) => {
                println!("    Bus voltage: {:.2} V", report.bus_voltage);
                println!("    Output:      {:.1}%", report.output_percent * 100.0);
                println!("    Current:     {:.2} A", report.current);
                println!("    Temperature: {:.1} °C", report.temperature);
                println!("    Position:    {:.3} rev", report.position);
                println!("    Speed:       {:.1} rpm", report.speed);
                println!("    Mode:        {:?}", report.mode);
                if report.faults.any() {
                    println!("    ⚠ Faults:    {:?}", report.faults);
                }
            }
            Err(e) => println!("    ERROR - {}", e),
        }
        println!();
    }

    println!("Diagnostic complete");
    Ok(())
}
