// CLI layer: declares the command-line interface with `clap` and maps
// each subcommand to exactly one `ApiClient` call. Results are printed as
// pretty JSON on stdout so the output can be piped into other tools.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use crate::api::{ApiClient, ApiError, Location, DEFAULT_BASE_URL};

/// Command-line client for the XPrivacyLua REST API.
///
/// The API listens on the device itself; forward it first with
/// `adb forward tcp:8271 tcp:8271`.
#[derive(Parser, Debug)]
#[command(name = "xlua", version)]
pub struct Cli {
    /// API key for authentication
    #[arg(long, env = "XLUA_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the API
    #[arg(long, env = "XLUA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Log requests and responses to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Get all available restrictions
    GetRestrictions,

    /// Get all apps with their restriction status
    GetApps,

    /// Get details about a specific app
    GetApp {
        /// Package name of the app
        package_name: String,
    },

    /// Get restrictions for a specific app
    GetAppRestrictions {
        /// Package name of the app
        package_name: String,
    },

    /// Set a restriction for a specific app
    SetAppRestriction {
        /// Package name of the app
        package_name: String,
        /// ID of the restriction
        restriction_id: String,
        #[command(flatten)]
        state: RestrictionState,
    },

    /// Get the fake location for a specific app
    GetLocation {
        /// Package name of the app
        package_name: String,
    },

    /// Set a fake location for a specific app
    #[command(allow_negative_numbers = true)]
    SetLocation {
        /// Package name of the app
        package_name: String,
        /// Latitude in degrees
        latitude: f64,
        /// Longitude in degrees
        longitude: f64,
        /// Accuracy in meters
        #[arg(long)]
        accuracy: Option<f64>,
        /// Altitude in meters
        #[arg(long)]
        altitude: Option<f64>,
        /// Speed in m/s
        #[arg(long)]
        speed: Option<f64>,
        /// Bearing in degrees
        #[arg(long)]
        bearing: Option<f64>,
        /// Fix time in milliseconds since the Unix epoch (server time if omitted)
        #[arg(long)]
        time: Option<i64>,
    },

    /// Reset the fake location for a specific app
    ResetLocation {
        /// Package name of the app
        package_name: String,
    },
}

/// Exactly one of `--enabled` / `--disabled` must be given.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct RestrictionState {
    /// Enable the restriction
    #[arg(long)]
    pub enabled: bool,

    /// Disable the restriction
    #[arg(long)]
    pub disabled: bool,
}

impl Command {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetRestrictions => "get-restrictions",
            Command::GetApps => "get-apps",
            Command::GetApp { .. } => "get-app",
            Command::GetAppRestrictions { .. } => "get-app-restrictions",
            Command::SetAppRestriction { .. } => "set-app-restriction",
            Command::GetLocation { .. } => "get-location",
            Command::SetLocation { .. } => "set-location",
            Command::ResetLocation { .. } => "reset-location",
        }
    }
}

/// Perform the API call behind `command` and return the response body.
pub fn execute(client: &ApiClient, command: &Command) -> Result<Value, ApiError> {
    match command {
        Command::GetRestrictions => client.get_restrictions(),
        Command::GetApps => client.get_apps(),
        Command::GetApp { package_name } => client.get_app(package_name),
        Command::GetAppRestrictions { package_name } => client.get_app_restrictions(package_name),
        Command::SetAppRestriction {
            package_name,
            restriction_id,
            state,
        } => client.set_app_restriction(package_name, restriction_id, state.enabled),
        Command::GetLocation { package_name } => client.get_location(package_name),
        Command::SetLocation {
            package_name,
            latitude,
            longitude,
            accuracy,
            altitude,
            speed,
            bearing,
            time,
        } => {
            let location = Location {
                latitude: *latitude,
                longitude: *longitude,
                accuracy: *accuracy,
                altitude: *altitude,
                speed: *speed,
                bearing: *bearing,
                time: *time,
            };
            client.set_location(package_name, &location)
        }
        Command::ResetLocation { package_name } => client.reset_location(package_name),
    }
}

/// Build the client, run the requested command and print its result.
pub fn run(cli: Cli) -> Result<()> {
    let client = ApiClient::new(&cli.api_key, &cli.base_url).context("Failed to build API client")?;
    debug!(command = cli.command.name(), base_url = %client.base_url(), "executing");

    let response = execute(&client, &cli.command)
        .with_context(|| format!("{} failed", cli.command.name()))?;
    print_json(&response)
}

/// Print JSON data in a readable format (two-space indentation).
pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
