use anyhow::{bail, Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use evalkit_core::{lookup_model, ConfigurationProfile, ModelConfig, SensorConfigTable};
use evalkit_hw::{tables, ConnectionPaths, Sensor, SimulatedBus, SimulatedConnector};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "evalkit", about = "Inspect and configure image-sensor evaluation boards")]
struct Cli {
    /// Camera model (overrides EVALKIT_MODEL)
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show identity, geometry and timing
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get or set exposure time in milliseconds
    Exposure {
        #[arg(long)]
        set: Option<f64>,
    },
    /// Get or set wait time in milliseconds
    WaitTime {
        #[arg(long)]
        set: Option<f64>,
    },
    /// Get or set the raw analog gain code
    Gain {
        #[arg(long, value_parser = parse_u16)]
        set: Option<u16>,
    },
    /// Get or set the image offset
    Offset {
        #[arg(long, value_parser = parse_u16)]
        set: Option<u16>,
    },
    /// Get or set the 2-bit clamp mode
    ClampMode {
        #[arg(long, value_parser = parse_u16)]
        set: Option<u16>,
    },
    /// Load a configuration profile (e.g. "RS-12b", "GS-10b", "User3")
    Profile {
        name: String,
        /// Return right after the trigger write instead of waiting for the board
        #[arg(long)]
        no_settle: bool,
    },
    /// List configuration profiles and their trigger codes
    Profiles,
    /// List built-in config tables for the model
    Tables,
    /// Apply a built-in config table, or one read from a TOML file
    ApplyTable {
        /// Built-in table name
        name: Option<String>,
        #[arg(long, conflicts_with = "name")]
        file: Option<PathBuf>,
    },
    /// Read the thermal sensor, optionally enabling it first
    Thermal {
        #[arg(long)]
        enable: bool,
    },
    /// Set white-balance gains and enable automatic white balance
    WhiteBalance {
        red: f64,
        green: f64,
        blue: f64,
        /// Run one balancing pass after setting the gains
        #[arg(long)]
        run: bool,
    },
    /// Turn vertical subsampling on or off
    Subsampling {
        #[arg(value_parser = BoolishValueParser::new(), action = ArgAction::Set)]
        enable: bool,
    },
    /// Read a sensor register (offset from the sensor base)
    Peek {
        #[arg(value_parser = parse_u64)]
        offset: u64,
    },
    /// Write a sensor register (offset from the sensor base)
    Poke {
        #[arg(value_parser = parse_u64)]
        offset: u64,
        #[arg(value_parser = parse_u16)]
        value: u16,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let model_name = cli.model.as_deref().unwrap_or(&config.model);
    let model = lookup_model(model_name).with_context(|| format!("unknown camera model: {model_name}"))?;

    let paths = config.connection_paths(model);
    let mut sensor = open_board(model, &paths)?;

    let outcome = run(&mut sensor, cli.command, &config);
    sensor.close();
    outcome
}

/// Open the board for `model`. Only the simulated transport is built in, so
/// `paths` are logged but not used to load a vendor SDK.
fn open_board(model: &'static ModelConfig, paths: &ConnectionPaths) -> Result<Sensor<SimulatedBus>> {
    tracing::info!(
        model = model.name,
        binary = %paths.binary.display(),
        descriptor = %paths.descriptor.display(),
        "no hardware transport available, using simulated board"
    );
    Sensor::open(&SimulatedConnector::new(model), paths, model).context("failed to open evaluation board")
}

fn run(sensor: &mut Sensor<SimulatedBus>, command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Info { json } => {
            let info = sensor.device_info()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
                return Ok(());
            }
            println!("Camera INFO:");
            println!("\tManufacturer info          {}", info.identity.vendor);
            println!("\tDevice name                {}", info.identity.model);
            println!("\tDevice version             {}", info.identity.version);
            println!("\tSerial number              {}", info.identity.serial);
            println!("\tDevice firmware version    {}", info.identity.firmware_version);
            println!("\tImage width                {}", info.geometry.width);
            println!("\tImage height               {}", info.geometry.height);
            println!("\tPixel format               {}", info.pixel_format.name);
            println!("\tLine length                {:.2} us", info.line_period_us);
            println!("\tExposure time              {:.2} ms", info.exposure_time_ms);
            if let Some(wait) = info.wait_time_ms {
                println!("\tWait time                  {wait:.2} ms");
            }
        }
        Commands::Exposure { set } => {
            if let Some(ms) = set {
                sensor.set_exposure_time_ms(ms)?;
            }
            println!("{:.3} ms", sensor.get_exposure_time_ms()?);
        }
        Commands::WaitTime { set } => {
            if let Some(ms) = set {
                sensor.set_wait_time_ms(ms)?;
            }
            println!("{:.3} ms", sensor.get_wait_time_ms()?);
        }
        Commands::Gain { set } => {
            if let Some(code) = set {
                sensor.set_analog_gain(code)?;
            }
            println!("{:#06x}", sensor.get_analog_gain()?);
        }
        Commands::Offset { set } => {
            if let Some(value) = set {
                sensor.set_image_offset(value)?;
            }
            println!("{:#06x}", sensor.get_image_offset()?);
        }
        Commands::ClampMode { set } => {
            if let Some(value) = set {
                sensor.set_clamp_mode(value)?;
            }
            println!("{}", sensor.get_clamp_mode()?);
        }
        Commands::Profile { name, no_settle } => {
            sensor.load_configuration_profile(&name)?;
            if !no_settle {
                sensor.settle(config.profile_settle)?;
            }
            println!("Loaded profile {name}");
        }
        Commands::Profiles => {
            for profile in ConfigurationProfile::all() {
                println!("{:<8} {}", profile.to_string(), profile.code());
            }
        }
        Commands::Tables => {
            for table in tables::tables_for_model(sensor.model().name) {
                println!(
                    "{:<24} {} entries, {} ms between writes",
                    table.name,
                    table.entries.len(),
                    table.inter_write_delay_ms
                );
            }
        }
        Commands::ApplyTable { name, file } => {
            let table = match (name, file) {
                (_, Some(path)) => SensorConfigTable::from_file(&path)?,
                (Some(name), None) => tables::lookup_table(&name)
                    .cloned()
                    .with_context(|| format!("no built-in table named {name}"))?,
                (None, None) => bail!("give a table name or --file"),
            };
            if !table.applies_to(sensor.model().name) {
                bail!(
                    "table {} targets {}, not {}",
                    table.name,
                    table.model.as_deref().unwrap_or("?"),
                    sensor.model().name
                );
            }
            sensor.apply_config_table(&table)?;
            println!("Applied {} ({} writes)", table.name, table.entries.len());
        }
        Commands::Thermal { enable } => {
            if enable {
                sensor.enable_thermal_sensor()?;
            }
            println!("{:.2} °C", sensor.read_thermal_celsius()?);
        }
        Commands::WhiteBalance {
            red,
            green,
            blue,
            run,
        } => {
            sensor.set_white_balance(red, green, blue)?;
            sensor.enable_white_balance(true)?;
            if run {
                sensor.trigger_white_balance(true)?;
                sensor.trigger_white_balance(false)?;
            }
        }
        Commands::Subsampling { enable } => {
            sensor.enable_vertical_subsampling(enable)?;
        }
        Commands::Peek { offset } => {
            println!("{:#06x}", sensor.read_sensor_register(offset)?);
        }
        Commands::Poke { offset, value } => {
            sensor.write_sensor_register(offset, value)?;
        }
    }
    Ok(())
}

/// Parse a decimal or `0x`-prefixed hexadecimal integer.
fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {s:?}: {e}"))
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let value = parse_u64(s)?;
    u16::try_from(value).map_err(|_| format!("{s} does not fit in 16 bits"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_u64("0x3000B"), Ok(0x3000B));
        assert_eq!(parse_u64("42"), Ok(42));
        assert!(parse_u64("0xZZ").is_err());
        assert_eq!(parse_u16("0x21C2"), Ok(0x21C2));
        assert!(parse_u16("0x10000").is_err());
    }

    #[test]
    fn test_parse_poke() {
        let cli = Cli::try_parse_from(["evalkit", "--model", "emerald", "poke", "0x04", "0x21C2"]).unwrap();
        assert_eq!(cli.model.as_deref(), Some("emerald"));
        assert!(matches!(cli.command, Commands::Poke { offset: 4, value: 0x21C2 }));
    }

    #[test]
    fn test_open_board_is_simulated_for_model() {
        let paths = ConnectionPaths::for_model(&evalkit_core::EMERALD, None);
        let sensor = open_board(&evalkit_core::EMERALD, &paths).unwrap();
        assert_eq!(sensor.model().name, "Emerald");
        assert!(sensor.transport().unwrap().log().is_empty());
    }

    #[test]
    fn test_run_profile_settles() {
        let mut sensor = Sensor::from_transport(
            SimulatedBus::for_model(&evalkit_core::EMERALD),
            &evalkit_core::EMERALD,
        );
        let config = Config {
            model: "emerald".into(),
            bin_dir: None,
            binary_name: None,
            descriptor_name: None,
            profile_settle: std::time::Duration::from_millis(250),
        };
        let command = Commands::Profile {
            name: "GS-10b".into(),
            no_settle: false,
        };
        run(&mut sensor, command, &config).unwrap();
        let log = sensor.transport().unwrap().log();
        assert_eq!(
            log,
            &[
                evalkit_hw::BusOp::Write { address: 0x10200, data: 4u32.to_le_bytes().to_vec() },
                evalkit_hw::BusOp::Settle(std::time::Duration::from_millis(250)),
            ]
        );
    }

    #[test]
    fn test_run_apply_table_rejects_other_model() {
        let mut sensor = Sensor::from_transport(
            SimulatedBus::for_model(&evalkit_core::TOPAZ),
            &evalkit_core::TOPAZ,
        );
        let config = Config {
            model: "topaz".into(),
            bin_dir: None,
            binary_name: None,
            descriptor_name: None,
            profile_settle: std::time::Duration::ZERO,
        };
        let command = Commands::ApplyTable {
            name: Some("emerald-range-gate".into()),
            file: None,
        };
        assert!(run(&mut sensor, command, &config).is_err());
        assert!(sensor.transport().unwrap().writes().is_empty());
    }
}
