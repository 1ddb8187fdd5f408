use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use yeelight_control_lib::control_interface::{ControlInterface, PowerState};
use yeelight_control_lib::util::discovery::{DeviceDescriptor, Discovery, DiscoveryConfig};
use yeelight_control_lib::util::local_address::SystemAddressProvider;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(err) = handle_cli(cli).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

/// This struct defines the command line interface of the application
#[derive(Parser)]
#[clap(
    name = "yeelight_control",
    about = "Discovers and controls Yeelight smart bulbs",
    version
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

/// Supported output formats for the `discover` command.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Plain text format.
    Plaintext,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

/// Subcommands available for the CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Sends one command to a bulb
    #[clap(name = "device-call")]
    DeviceCall {
        /// Address of the bulb as host:port, e.g. 192.168.1.20:55443
        #[clap(long)]
        address: String,

        /// Device id, only used in log output
        #[clap(long, default_value = "cli")]
        id: String,

        /// Device model, only used in log output
        #[clap(long, default_value = "")]
        model: String,

        /// Connect timeout in milliseconds, 0 to wait for the OS default
        #[clap(long = "connect-timeout", default_value_t = 5000)]
        connect_timeout: u64,

        #[clap(subcommand)]
        action: DeviceAction,
    },
    /// Searches the local network for a bulb
    #[clap(name = "discover")]
    Discover {
        /// Output format (plaintext, json, yaml)
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Plaintext)]
        output: OutputFormat,

        /// Search timeout in milliseconds
        #[clap(short = 't', long = "timeout", default_value_t = 3000)]
        timeout: u64,
    },
}

/// Actions available under the `device-call` subcommand
#[derive(Subcommand)]
pub enum DeviceAction {
    /// Flips the power state.
    #[clap(name = "toggle")]
    Toggle,
    /// Turns the bulb on or off.
    #[clap(name = "set-power")]
    SetPower {
        #[clap(value_enum)]
        state: PowerState,
    },
}

async fn handle_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Discover { output, timeout } => {
            let config = DiscoveryConfig {
                timeout: Duration::from_millis(timeout),
                ..Default::default()
            };
            let device = Discovery::discover_with(&SystemAddressProvider, &config)
                .await
                .context("Discovery failed")?;
            match output {
                OutputFormat::Plaintext => {
                    Discovery::pretty_print_device(&device);
                }
                OutputFormat::Json => {
                    let json = serde_json::to_string(&device)?;
                    println!("{}", json);
                }
                OutputFormat::Yaml => {
                    let yaml = serde_yaml::to_string(&device)?;
                    println!("{}", yaml);
                }
            }
        }
        Commands::DeviceCall {
            address,
            id,
            model,
            connect_timeout,
            action,
        } => {
            let device = DeviceDescriptor::new(id.clone(), id, address, model, Vec::new());
            let connect_timeout = match connect_timeout {
                0 => None,
                millis => Some(Duration::from_millis(millis)),
            };
            let control = ControlInterface::new(device)?.with_connect_timeout(connect_timeout);

            match action {
                DeviceAction::Toggle => {
                    control.toggle().await.context("Toggle failed")?;
                    println!("Toggled {}", control.device().address);
                }
                DeviceAction::SetPower { state } => {
                    control.set_power(state).await.context("Set power failed")?;
                    println!("Power set to {} on {}", state.as_str(), control.device().address);
                }
            }
        }
    }

    Ok(())
}
