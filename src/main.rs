use std::path::PathBuf;
use std::process::ExitCode;
use std::thread::sleep;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jaguar_serial::can::api::{DEVTYPE_MOTORCTRL, MANUFACTURER_TI, Operation};
use jaguar_serial::can::{self, CanMessage};
use jaguar_serial::config::LinkConfig;
use jaguar_serial::{JaguarDriver, JaguarError, Result};

#[derive(Parser)]
#[command(name = "jaguar", version, about = "Jaguar motor controllers over RS232")]
struct Cli {
    /// JSON link configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serial port (overrides the configuration file)
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Baud rate (overrides the configuration file)
    #[arg(short, long, global = true)]
    baud: Option<u32>,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read every status value of a controller
    Status {
        #[arg(short, long)]
        device: u8,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read the firmware version of a controller
    Firmware {
        #[arg(short, long)]
        device: u8,
    },
    /// Drive a controller in voltage mode for a while, then disable it
    Voltage {
        #[arg(short, long)]
        device: u8,
        /// Output fraction, -1.0 to 1.0
        #[arg(allow_hyphen_values = true)]
        fraction: f32,
        /// How long to hold the output before disabling
        #[arg(long, default_value_t = 1000)]
        hold_ms: u64,
    },
    /// Halt every controller on the link
    Halt,
    /// Resume every controller after a halt
    Resume,
    /// Print the frame for a message without touching the link
    Encode {
        #[arg(short, long)]
        device: u8,
        #[arg(long)]
        class: u8,
        #[arg(long)]
        index: u8,
        #[arg(long, default_value_t = MANUFACTURER_TI)]
        manufacturer: u8,
        #[arg(long, default_value_t = DEVTYPE_MOTORCTRL)]
        device_type: u8,
        /// Payload as hex, e.g. 3412
        #[arg(default_value = "")]
        payload: String,
    },
    /// Decode a hex frame without touching the link
    Decode { frame: String },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if let Some(&bad) = digits.iter().find(|b| !b.is_ascii_hexdigit()) {
        return Err(JaguarError::Config(format!(
            "invalid hex {:?}: unexpected byte 0x{:02X}",
            text, bad
        )));
    }
    if digits.len() % 2 != 0 {
        return Err(JaguarError::Config(format!("odd number of hex digits in {:?}", text)));
    }
    Ok(digits
        .chunks(2)
        .map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1]))
        .collect())
}

// Caller guarantees an ASCII hex digit
fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

fn link_config(cli: &Cli) -> Result<LinkConfig> {
    let mut config = match &cli.config {
        Some(path) => LinkConfig::from_file(path)?,
        None => LinkConfig::default(),
    };
    if let Some(port) = &cli.port {
        config.port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.baudrate = baud;
    }
    Ok(config)
}

fn print_message(message: &CanMessage) {
    println!("device:       {}", message.device);
    println!("api class:    {}", message.api_class);
    println!("api index:    {}", message.api_index);
    println!("manufacturer: {}", message.manufacturer);
    println!("device type:  {}", message.device_type);
    println!("payload:      {:02X?}", message.payload());
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Encode {
            device,
            class,
            index,
            manufacturer,
            device_type,
            ref payload,
        } => {
            let payload = parse_hex(payload)?;
            let message = CanMessage::new(
                device,
                Operation::new(class, index),
                manufacturer,
                device_type,
                &payload,
            )
            .map_err(JaguarError::InvalidRequest)?;
            let frame = can::encode(&message);
            println!("{:02X?}", frame.as_bytes());
            return Ok(());
        }
        Command::Decode { ref frame } => {
            let bytes = parse_hex(frame)?;
            print_message(&can::decode(&bytes)?);
            return Ok(());
        }
        _ => {}
    }

    let config = link_config(&cli)?;
    let mut driver = JaguarDriver::open(&config)?;

    match cli.command {
        Command::Status { device, json } => {
            let report = driver.read_status(device)?;
            if json {
                let text = serde_json::to_string_pretty(&report)
                    .map_err(|e| JaguarError::Config(e.to_string()))?;
                println!("{}", text);
            } else {
                println!("Device {}", report.device);
                println!("  Output:       {:.1}%", report.output_percent * 100.0);
                println!("  Output volts: {:.2} V", report.output_volts);
                println!("  Bus voltage:  {:.2} V", report.bus_voltage);
                println!("  Current:      {:.2} A", report.current);
                println!("  Temperature:  {:.1} °C", report.temperature);
                println!("  Position:     {:.3} rev", report.position);
                println!("  Speed:        {:.1} rpm", report.speed);
                println!("  Limits:       {:?}", report.limit);
                println!("  Faults:       {:?}", report.faults);
                println!("  Power:        {}", report.power);
                println!("  Mode:         {:?}", report.mode);
            }
        }
        Command::Firmware { device } => {
            let info = driver.device_info(device)?;
            println!("Device {}: firmware {}", info.device, info.firmware_version);
        }
        Command::Voltage {
            device,
            fraction,
            hold_ms,
        } => {
            driver.voltage_enable(device)?;
            driver.voltage_set(device, fraction)?;
            info!("Holding output {:.3} for {} ms", fraction, hold_ms);
            sleep(Duration::from_millis(hold_ms));
            driver.voltage_set(device, 0.0)?;
            driver.voltage_disable(device)?;
        }
        Command::Halt => driver.halt()?,
        Command::Resume => driver.resume()?,
        Command::Encode { .. } | Command::Decode { .. } => {}
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
