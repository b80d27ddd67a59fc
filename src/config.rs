//! Non-sensitive application settings stored as a JSON file on disk.

use std::{
    fs,
    io::ErrorKind,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, timezone::get_local_offset};

/// The colour scheme preferred by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    Claro,
    /// Dark theme.
    Escuro,
    /// Follow the operating system.
    #[default]
    Sistema,
}

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// The IP address to bind to.
    pub ip: IpAddr,
    /// The port to serve the API from.
    #[serde(rename = "porta")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
        }
    }
}

impl ServerSettings {
    /// The socket address built from the IP and port.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

/// The application settings.
///
/// Fields missing from the settings file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The client's colour scheme.
    #[serde(rename = "tema")]
    pub theme: Theme,
    /// Whether the client should show notifications.
    #[serde(rename = "notificacoes")]
    pub notifications: bool,
    /// The monthly spending limit, if any. The dashboard reports when the
    /// month's expenses exceed it.
    #[serde(rename = "limite_gastos")]
    pub spending_limit: Option<f64>,
    /// Where the server listens.
    #[serde(rename = "servidor")]
    pub server: ServerSettings,
    /// File path to the application SQLite database.
    #[serde(rename = "banco_dados")]
    pub db_path: PathBuf,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    #[serde(rename = "fuso_horario")]
    pub timezone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            notifications: true,
            spending_limit: None,
            server: ServerSettings::default(),
            db_path: PathBuf::from("financas.db"),
            timezone: "America/Sao_Paulo".to_owned(),
        }
    }
}

impl Settings {
    /// Load the settings from the JSON file at `path`.
    ///
    /// A missing file gives the default settings.
    ///
    /// # Errors
    /// Returns [Error::SettingsError] if the file cannot be read or parsed,
    /// or if it names an unknown timezone or a negative spending limit.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "No settings file at {}, using the default settings.",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(Error::SettingsError(format!(
                    "could not read {}: {error}",
                    path.display()
                )));
            }
        };

        let settings: Settings = serde_json::from_str(&text).map_err(|error| {
            Error::SettingsError(format!("could not parse {}: {error}", path.display()))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), Error> {
        if get_local_offset(&self.timezone).is_none() {
            return Err(Error::SettingsError(format!(
                "unknown timezone \"{}\"",
                self.timezone
            )));
        }

        if let Some(limit) = self.spending_limit
            && !(limit.is_finite() && limit >= 0.0)
        {
            return Err(Error::SettingsError(format!(
                "the spending limit {limit} must not be negative"
            )));
        }

        Ok(())
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(state: &AppState) -> Self {
        state.settings.clone()
    }
}

/// A route handler for reading the current settings.
pub async fn get_settings_endpoint(State(settings): State<Settings>) -> Json<Settings> {
    Json(settings)
}
