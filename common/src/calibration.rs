use crate::config::{CalibrationSettings, TempScale};
use crate::error::ControlError;

/// Two-point linear sensor calibration against the freezing and boiling
/// reference temperatures at the configured elevation.
///
/// Rounding policy: `correct` returns the unrounded corrected value, which
/// feeds hysteresis comparisons and the significant-change filter; callers
/// round to one decimal for display and persistence only.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationProfile {
    freezing_point: f32,
    freezing_measured: f32,
    reference_range: f32,
    measured_range: f32,
}

impl CalibrationProfile {
    pub fn new(scale: TempScale, settings: &CalibrationSettings) -> Result<Self, ControlError> {
        let (freezing_point, boiling_point) = match scale {
            TempScale::Metric => (0.01, 100.0 - 0.003353 * settings.elevation),
            TempScale::Imperial => (32.018, 212.0 - 0.00184 * settings.elevation),
        };

        let measured_range = settings.boiling_measured - settings.freezing_measured;
        if measured_range == 0.0 || !measured_range.is_finite() {
            return Err(ControlError::config(format!(
                "calibration measured range is {} (boilingMeasured {}, freezingMeasured {})",
                measured_range, settings.boiling_measured, settings.freezing_measured
            )));
        }

        Ok(Self {
            freezing_point,
            freezing_measured: settings.freezing_measured,
            reference_range: boiling_point - freezing_point,
            measured_range,
        })
    }

    pub fn correct(&self, raw: f32) -> f32 {
        (raw - self.freezing_measured) * self.reference_range / self.measured_range
            + self.freezing_point
    }
}

/// One-decimal rounding used for displayed and persisted temperatures.
pub fn round_display(temp: f32) -> f32 {
    (temp * 10.0).round() / 10.0
}
