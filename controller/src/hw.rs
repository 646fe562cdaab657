use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use hvac_common::config::{ProbeDriver, ProbeSettings, TempScale};
use hvac_common::{ControlError, RelayOutputs};

/// Raw temperature source. Readings are pre-calibration, in the configured
/// scale; failures surface as transient errors the control loop rides out
/// with the last known value.
pub trait TemperatureProbe: Send {
    fn read(&mut self) -> Result<f32, ControlError>;
}

/// Relay outputs sink. `apply` is level-based and must be safe to call with
/// an unchanged value every tick.
pub trait RelayBank: Send {
    fn apply(&mut self, outputs: RelayOutputs) -> Result<(), ControlError>;
}

pub fn build_probe(settings: &ProbeSettings, scale: TempScale) -> Box<dyn TemperatureProbe> {
    match settings.driver {
        ProbeDriver::W1 => Box::new(W1Probe::new(settings.device.clone(), scale)),
        ProbeDriver::Simulated => Box::new(SimulatedProbe::new(scale)),
    }
}

pub fn build_relay_bank(heat_pin: u32, cool_pin: u32, fan_pin: u32) -> Box<dyn RelayBank> {
    if Path::new(GPIO_ROOT).exists() {
        Box::new(GpioRelayBank::new(heat_pin, cool_pin, fan_pin))
    } else {
        Box::new(SimulatedRelayBank::default())
    }
}

const W1_ROOT: &str = "/sys/bus/w1/devices";
const GPIO_ROOT: &str = "/sys/class/gpio";

/// DS18B20 over the 1-Wire sysfs interface. The bus reports Celsius; the
/// probe converts to Fahrenheit before calibration when the scale asks.
pub struct W1Probe {
    device: Option<String>,
    scale: TempScale,
}

impl W1Probe {
    pub fn new(device: Option<String>, scale: TempScale) -> Self {
        Self { device, scale }
    }

    fn device_path(&mut self) -> Result<PathBuf, ControlError> {
        let device = match &self.device {
            Some(device) => device.clone(),
            None => {
                let found = detect_w1_device(Path::new(W1_ROOT))?;
                self.device = Some(found.clone());
                found
            }
        };
        Ok(Path::new(W1_ROOT).join(device).join("w1_slave"))
    }
}

impl TemperatureProbe for W1Probe {
    fn read(&mut self) -> Result<f32, ControlError> {
        let path = self.device_path()?;
        let raw = fs::read_to_string(&path).map_err(|err| {
            self.device = None;
            ControlError::transient(format!("w1 read {}: {err}", path.display()))
        })?;
        let celsius = parse_w1_slave(&raw)?;
        Ok(match self.scale {
            TempScale::Metric => celsius,
            TempScale::Imperial => celsius * 9.0 / 5.0 + 32.0,
        })
    }
}

fn detect_w1_device(root: &Path) -> Result<String, ControlError> {
    let entries = fs::read_dir(root)
        .map_err(|err| ControlError::transient(format!("w1 bus unavailable: {err}")))?;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        // DS18B20 family prefix.
        if name.starts_with("28-") {
            return Ok(name);
        }
    }
    Err(ControlError::transient("no w1 temperature device found"))
}

fn parse_w1_slave(raw: &str) -> Result<f32, ControlError> {
    let mut lines = raw.lines();
    let crc_line = lines
        .next()
        .ok_or_else(|| ControlError::transient("empty w1_slave payload"))?;
    if !crc_line.trim_end().ends_with("YES") {
        return Err(ControlError::transient("w1 CRC check failed"));
    }
    let data_line = lines
        .next()
        .ok_or_else(|| ControlError::transient("truncated w1_slave payload"))?;
    let milli = data_line
        .rsplit_once("t=")
        .and_then(|(_, value)| value.trim().parse::<i32>().ok())
        .ok_or_else(|| ControlError::transient("malformed w1_slave payload"))?;
    Ok(milli as f32 / 1000.0)
}

/// Development probe: a slow triangle wave around a comfortable baseline, so
/// relay transitions actually happen without hardware attached.
pub struct SimulatedProbe {
    base: f32,
    amplitude: f32,
    tick: u32,
}

impl SimulatedProbe {
    pub fn new(scale: TempScale) -> Self {
        let (base, amplitude) = match scale {
            TempScale::Metric => (21.0, 2.0),
            TempScale::Imperial => (70.0, 4.0),
        };
        Self {
            base,
            amplitude,
            tick: 0,
        }
    }
}

impl TemperatureProbe for SimulatedProbe {
    fn read(&mut self) -> Result<f32, ControlError> {
        const PERIOD: u32 = 120;
        let phase = self.tick % PERIOD;
        self.tick = self.tick.wrapping_add(1);
        let half = PERIOD / 2;
        let fraction = if phase < half {
            phase as f32 / half as f32
        } else {
            (PERIOD - phase) as f32 / half as f32
        };
        Ok(self.base - self.amplitude + 2.0 * self.amplitude * fraction)
    }
}

/// Sysfs GPIO relay bank. The board drives relays active-low: logic 0 closes
/// the relay contact.
pub struct GpioRelayBank {
    heat_pin: u32,
    cool_pin: u32,
    fan_pin: u32,
    exported: bool,
}

impl GpioRelayBank {
    pub fn new(heat_pin: u32, cool_pin: u32, fan_pin: u32) -> Self {
        Self {
            heat_pin,
            cool_pin,
            fan_pin,
            exported: false,
        }
    }

    fn export(&mut self) -> Result<(), ControlError> {
        if self.exported {
            return Ok(());
        }
        for pin in [self.heat_pin, self.cool_pin, self.fan_pin] {
            let pin_dir = format!("{GPIO_ROOT}/gpio{pin}");
            if !Path::new(&pin_dir).exists() {
                fs::write(format!("{GPIO_ROOT}/export"), pin.to_string()).map_err(|err| {
                    ControlError::transient(format!("gpio export {pin}: {err}"))
                })?;
            }
            fs::write(format!("{pin_dir}/direction"), "out")
                .map_err(|err| ControlError::transient(format!("gpio direction {pin}: {err}")))?;
        }
        self.exported = true;
        Ok(())
    }

    fn write_level(pin: u32, closed: bool) -> Result<(), ControlError> {
        let level = gpio_level(closed);
        fs::write(format!("{GPIO_ROOT}/gpio{pin}/value"), level)
            .map_err(|err| ControlError::transient(format!("gpio write {pin}: {err}")))
    }
}

fn gpio_level(closed: bool) -> &'static str {
    if closed {
        "0"
    } else {
        "1"
    }
}

impl RelayBank for GpioRelayBank {
    fn apply(&mut self, outputs: RelayOutputs) -> Result<(), ControlError> {
        self.export()?;
        Self::write_level(self.heat_pin, outputs.heat)?;
        Self::write_level(self.cool_pin, outputs.cool)?;
        Self::write_level(self.fan_pin, outputs.fan)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct SimulatedRelayBank {
    last: Option<RelayOutputs>,
}

impl RelayBank for SimulatedRelayBank {
    fn apply(&mut self, outputs: RelayOutputs) -> Result<(), ControlError> {
        if self.last != Some(outputs) {
            debug!(
                heat = outputs.heat,
                cool = outputs.cool,
                fan = outputs.fan,
                "relay outputs"
            );
            self.last = Some(outputs);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_w1_slave_payload() {
        let raw = "4b 01 4b 46 7f ff 0c 10 d8 : crc=d8 YES\n\
                   4b 01 4b 46 7f ff 0c 10 d8 t=20687\n";
        assert_eq!(parse_w1_slave(raw).unwrap(), 20.687);
    }

    #[test]
    fn rejects_failed_crc() {
        let raw = "4b 01 4b 46 7f ff 0c 10 d8 : crc=d8 NO\n\
                   4b 01 4b 46 7f ff 0c 10 d8 t=20687\n";
        assert!(parse_w1_slave(raw).is_err());
    }

    #[test]
    fn rejects_garbage_payload() {
        assert!(parse_w1_slave("").is_err());
        assert!(parse_w1_slave("YES\nno temperature here\n").is_err());
    }

    #[test]
    fn active_low_levels() {
        assert_eq!(gpio_level(true), "0");
        assert_eq!(gpio_level(false), "1");
    }

    #[test]
    fn simulated_probe_stays_in_band() {
        let mut probe = SimulatedProbe::new(TempScale::Metric);
        for _ in 0..300 {
            let value = probe.read().unwrap();
            assert!((19.0..=23.0).contains(&value), "value out of band: {value}");
        }
    }
}
