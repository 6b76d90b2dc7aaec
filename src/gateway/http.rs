// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tasmota gateway over the HTTP web API.

use std::time::Duration;

use reqwest::Client;

use crate::Capabilities;
use crate::error::{DeviceError, ParseError, ProtocolError};
use crate::gateway::response::{DimmerResponse, PowerResponse};
use crate::gateway::{ControlPoint, DeviceGateway};
use crate::types::{Brightness, PowerState, RgbColor};

// ============================================================================
// HttpConfig
// ============================================================================

/// Configuration for a Tasmota light reached over HTTP.
///
/// # Examples
///
/// ```
/// use sleeplight::gateway::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.1.100")
///     .with_port(8080)
///     .with_credentials("admin", "password")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "http://192.168.1.100:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    use_https: bool,
    credentials: Option<(String, String)>,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a new HTTP configuration for the specified host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            use_https: false,
            credentials: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables HTTPS.
    ///
    /// If port hasn't been explicitly set, it will be changed to 443.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        if self.port == Self::DEFAULT_PORT {
            self.port = Self::DEFAULT_HTTPS_PORT;
        }
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        let port_suffix =
            if (self.use_https && self.port == 443) || (!self.use_https && self.port == 80) {
                String::new()
            } else {
                format!(":{}", self.port)
            };
        format!("{scheme}://{}{port_suffix}", self.host)
    }
}

// ============================================================================
// TasmotaGateway
// ============================================================================

/// Drives a Tasmota light through its web API endpoint `/cm?cmnd=<command>`.
///
/// Each write is checked against the state the device reports back; a write
/// the device did not apply counts as failed.
///
/// # Examples
///
/// ```no_run
/// use sleeplight::Capabilities;
/// use sleeplight::gateway::{DeviceGateway, HttpConfig, TasmotaGateway};
/// use sleeplight::types::PowerState;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = TasmotaGateway::new(HttpConfig::new("192.168.1.100"))?
///     .with_capabilities(Capabilities::dimmable_light());
/// gateway.set_power(PowerState::On).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TasmotaGateway {
    base_url: String,
    client: Client,
    credentials: Option<(String, String)>,
    capabilities: Capabilities,
}

impl TasmotaGateway {
    /// Creates a gateway for an RGB light.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: HttpConfig) -> Result<Self, ProtocolError> {
        let base_url = config.base_url();

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self {
            base_url,
            client,
            credentials: config.credentials,
            capabilities: Capabilities::rgb_light(),
        })
    }

    /// Declares which control points the light has.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, command: &str) -> String {
        self.url_with_password(command, |password| urlencoding::encode(password).into_owned())
    }

    /// Same as `build_url` with the password masked, for logging.
    fn redacted_url(&self, command: &str) -> String {
        self.url_with_password(command, |_| "***".to_string())
    }

    fn url_with_password(&self, command: &str, password: impl FnOnce(&str) -> String) -> String {
        let encoded_command = urlencoding::encode(command);

        match &self.credentials {
            Some((username, secret)) => format!(
                "{}/cm?user={}&password={}&cmnd={}",
                self.base_url,
                urlencoding::encode(username),
                password(secret),
                encoded_command
            ),
            None => format!("{}/cm?cmnd={}", self.base_url, encoded_command),
        }
    }

    async fn send(&self, point: ControlPoint, command: &str) -> Result<String, DeviceError> {
        if !self.capabilities.supports(point) {
            return Err(DeviceError::Unavailable(point));
        }

        let url = self.build_url(command);
        tracing::debug!(url = %self.redacted_url(command), command, "Sending HTTP command");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::AuthenticationFailed.into());
        }

        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            ))
            .into());
        }

        let body = response.text().await.map_err(ProtocolError::Http)?;
        tracing::trace!(body = %body, "Received HTTP response");
        Ok(body)
    }
}

fn parse<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, DeviceError> {
    serde_json::from_str(body).map_err(|e| ParseError::Json(e).into())
}

impl DeviceGateway for TasmotaGateway {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn set_power(&self, state: PowerState) -> Result<(), DeviceError> {
        let body = self
            .send(ControlPoint::Power, &format!("Power {}", state.as_str()))
            .await?;
        let reported = parse::<PowerResponse>(&body)?.power_state()?;

        if reported == state {
            Ok(())
        } else {
            Err(DeviceError::WriteFailed {
                point: ControlPoint::Power,
                message: format!("device reports {reported} after setting {state}"),
            })
        }
    }

    async fn set_brightness(&self, brightness: Brightness) -> Result<(), DeviceError> {
        let body = self
            .send(
                ControlPoint::Brightness,
                &format!("Dimmer {}", brightness.value()),
            )
            .await?;
        let reported = parse::<DimmerResponse>(&body)?.brightness()?;

        if reported == brightness {
            Ok(())
        } else {
            Err(DeviceError::WriteFailed {
                point: ControlPoint::Brightness,
                message: format!("device reports {reported} after setting {brightness}"),
            })
        }
    }

    async fn set_color(&self, color: RgbColor) -> Result<(), DeviceError> {
        let body = self
            .send(ControlPoint::Color, &format!("Color {}", color.to_hex()))
            .await?;
        let value: serde_json::Value = parse(&body)?;

        // Devices with white channels append them to the reported color.
        match value.get("Color").and_then(serde_json::Value::as_str) {
            Some(reported) if reported.starts_with(&color.to_hex()) => Ok(()),
            Some(reported) => Err(DeviceError::WriteFailed {
                point: ControlPoint::Color,
                message: format!("device reports {reported} after setting {color}"),
            }),
            None => Err(ParseError::MissingField("Color".to_string()).into()),
        }
    }

    async fn power(&self) -> Result<PowerState, DeviceError> {
        let body = self.send(ControlPoint::Power, "Power").await?;
        Ok(parse::<PowerResponse>(&body)?.power_state()?)
    }

    async fn brightness(&self) -> Result<Brightness, DeviceError> {
        let body = self.send(ControlPoint::Brightness, "Dimmer").await?;
        Ok(parse::<DimmerResponse>(&body)?.brightness()?)
    }
}
