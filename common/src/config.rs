use serde::{Deserialize, Serialize};

use crate::error::ControlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempScale {
    Metric,
    Imperial,
}

impl TempScale {
    /// Minimum corrected-temperature delta that counts as a reportable change.
    pub fn tolerance(self) -> f32 {
        match self {
            Self::Metric => 0.1,
            Self::Imperial => 0.18,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationSettings {
    #[serde(default)]
    pub elevation: f32,
    #[serde(rename = "boilingMeasured")]
    pub boiling_measured: f32,
    #[serde(rename = "freezingMeasured")]
    pub freezing_measured: f32,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            elevation: 0.0,
            boiling_measured: 100.0,
            freezing_measured: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermostatSettings {
    #[serde(rename = "tempHysteresis")]
    pub temp_hysteresis: f32,
    #[serde(rename = "tempCheckInterval")]
    pub temp_check_interval_s: u64,
    #[serde(rename = "minTemp")]
    pub min_temp: f32,
    #[serde(rename = "maxTemp")]
    pub max_temp: f32,
    #[serde(rename = "tempStep")]
    pub temp_step: f32,
    #[serde(rename = "heatPin")]
    pub heat_pin: u32,
    #[serde(rename = "coolPin")]
    pub cool_pin: u32,
    #[serde(rename = "fanPin")]
    pub fan_pin: u32,
}

impl Default for ThermostatSettings {
    fn default() -> Self {
        Self {
            temp_hysteresis: 0.5,
            temp_check_interval_s: 3,
            min_temp: 15.0,
            max_temp: 30.0,
            temp_step: 0.5,
            heat_pin: 23,
            cool_pin: 18,
            fan_pin: 25,
        }
    }
}

/// Setpoint bounds enforced by the command synchronizer.
#[derive(Debug, Clone, Copy)]
pub struct SetpointLimits {
    pub min_temp: f32,
    pub max_temp: f32,
    pub temp_step: f32,
}

impl ThermostatSettings {
    pub fn limits(&self) -> SetpointLimits {
        SetpointLimits {
            min_temp: self.min_temp,
            max_temp: self.max_temp,
            temp_step: self.temp_step,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttSettings {
    pub enabled: bool,
    #[serde(rename = "clientID")]
    pub client_id: String,
    pub server: String,
    pub port: u16,
    #[serde(rename = "pubPrefix")]
    pub pub_prefix: String,
    /// Optional outside-conditions feed: a JSON payload on this topic carries
    /// the outdoor temperature under `outside_key`.
    #[serde(rename = "outsideTopic", default)]
    pub outside_topic: Option<String>,
    #[serde(rename = "outsideKey", default = "default_outside_key")]
    pub outside_key: String,
}

fn default_outside_key() -> String {
    "temperature".to_string()
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            client_id: "thermostat1".to_string(),
            server: "127.0.0.1".to_string(),
            port: 1883,
            pub_prefix: "thermostat".to_string(),
            outside_topic: None,
            outside_key: default_outside_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSettings {
    pub enabled: bool,
    /// Companion-unit name used to build its command topics.
    pub name: String,
    /// Outside temperature above which heat-mode auto-power is suppressed.
    #[serde(rename = "summerThreshold")]
    pub summer_threshold: f32,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            name: "GuestAC".to_string(),
            summer_threshold: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeDriver {
    W1,
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    pub driver: ProbeDriver,
    /// 1-Wire device id (e.g. `28-0316a2798bff`); autodetected when absent.
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            driver: ProbeDriver::Simulated,
            device: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "tempScale")]
    pub scale: TempScale,
    pub calibration: CalibrationSettings,
    pub thermostat: ThermostatSettings,
    pub mqtt: MqttSettings,
    pub bridge: BridgeSettings,
    pub probe: ProbeSettings,
    pub timezone: String,
    #[serde(rename = "useTestSchedule", default)]
    pub use_test_schedule: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: TempScale::Metric,
            calibration: CalibrationSettings::default(),
            thermostat: ThermostatSettings::default(),
            mqtt: MqttSettings::default(),
            bridge: BridgeSettings::default(),
            probe: ProbeSettings::default(),
            timezone: "Europe/Vienna".to_string(),
            use_test_schedule: false,
        }
    }
}

impl Settings {
    /// Startup validation. Anything wrong here refuses to start the process;
    /// the calibration range itself is checked by `CalibrationProfile::new`.
    pub fn validate(&self) -> Result<(), ControlError> {
        let t = &self.thermostat;
        if !(t.min_temp < t.max_temp) {
            return Err(ControlError::config(format!(
                "minTemp {} must be below maxTemp {}",
                t.min_temp, t.max_temp
            )));
        }
        if !(t.temp_step > 0.0) || !t.temp_step.is_finite() {
            return Err(ControlError::config(format!(
                "tempStep {} must be positive",
                t.temp_step
            )));
        }
        if !(t.temp_hysteresis > 0.0) || !t.temp_hysteresis.is_finite() {
            return Err(ControlError::config(format!(
                "tempHysteresis {} must be positive",
                t.temp_hysteresis
            )));
        }
        if t.temp_check_interval_s == 0 {
            return Err(ControlError::config("tempCheckInterval must be >= 1s"));
        }
        if self.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ControlError::config(format!(
                "unknown timezone {:?}",
                self.timezone
            )));
        }
        Ok(())
    }
}
