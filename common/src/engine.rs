use chrono::{DateTime, FixedOffset};

use crate::bridge::{self, AcControlMessage};
use crate::calibration::{round_display, CalibrationProfile};
use crate::command::{self, Command, CommandOutcome};
use crate::config::SetpointLimits;
use crate::error::ControlError;
use crate::relay::{self, RelayEvent, RelayOutputs};
use crate::schedule::{minute_of_week, ScheduleRunner, ScheduleTable};
use crate::state::{ControlState, PersistedState, StateEvent, StatusView};

/// Composition of the control core: calibration, command synchronization,
/// schedule firing, relay evaluation and bridge derivation over one shared
/// `ControlState`. Holds no I/O and no clock; callers inject readings and
/// wall-clock time, which keeps every path unit-testable.
pub struct ControlEngine {
    state: ControlState,
    calibration: CalibrationProfile,
    limits: SetpointLimits,
    hysteresis: f32,
    tolerance: f32,
    /// Unrounded corrected temperature; feeds hysteresis comparisons while
    /// `state.current_temp` carries the rounded display value.
    corrected: f32,
    prior_corrected: Option<f32>,
    schedule: ScheduleRunner,
}

impl ControlEngine {
    pub fn new(
        calibration: CalibrationProfile,
        limits: SetpointLimits,
        hysteresis: f32,
        tolerance: f32,
        initial: ControlState,
    ) -> Self {
        Self {
            corrected: initial.current_temp,
            state: initial,
            calibration,
            limits,
            hysteresis,
            tolerance,
            prior_corrected: None,
            schedule: ScheduleRunner::default(),
        }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Feeds one sensor reading through calibration. `None` (sensor
    /// unavailable) leaves the last known temperature in place; the relay
    /// machinery still runs on it. Returns a temperature event only when the
    /// corrected value moved by at least the configured tolerance.
    pub fn update_sensor(&mut self, raw: Option<f32>) -> Option<StateEvent> {
        let raw = raw?;
        let corrected = self.calibration.correct(raw);
        self.corrected = corrected;
        self.state.current_temp = round_display(corrected);

        let significant = self
            .prior_corrected
            .is_none_or(|prior| (corrected - prior).abs() >= self.tolerance);
        if significant {
            self.prior_corrected = Some(corrected);
            Some(StateEvent::TemperatureChanged(self.state.current_temp))
        } else {
            None
        }
    }

    pub fn apply_command(&mut self, cmd: Command) -> Result<CommandOutcome, ControlError> {
        command::apply(&mut self.state, &self.limits, cmd)
    }

    /// Installs (or clears) the active schedule table, replacing whatever
    /// was loaded before. Entries of the replaced table can never fire.
    pub fn install_schedule(&mut self, table: Option<ScheduleTable>) {
        self.schedule.install(table);
    }

    /// Applies schedule entries whose time arrived. With hold active the
    /// runner is left untouched entirely, mirroring the original scheduler
    /// thread that skips its pending pass during hold.
    pub fn run_schedule(&mut self, now: DateTime<FixedOffset>) -> Vec<StateEvent> {
        if self.state.hold {
            return Vec::new();
        }

        self.schedule
            .due(minute_of_week(now))
            .into_iter()
            .map(|entry| {
                let set_temp = round_display(entry.set_temp);
                self.state.set_temp = set_temp;
                StateEvent::ScheduleSetpoint(set_temp)
            })
            .collect()
    }

    /// Recomputes the relay outputs from the unrounded corrected temperature
    /// and stores them back; returns the edge transitions.
    pub fn evaluate_relays(&mut self) -> Vec<RelayEvent> {
        let prev = RelayOutputs::from_state(&self.state);
        let next = relay::evaluate(&self.state, self.corrected, self.hysteresis);
        self.state.relay_heat = next.heat;
        self.state.relay_cool = next.cool;
        self.state.relay_fan = next.fan;
        relay::transitions(prev, next)
    }

    pub fn relay_outputs(&self) -> RelayOutputs {
        RelayOutputs::from_state(&self.state)
    }

    pub fn derive_ac_message(
        &self,
        summer_threshold: f32,
        outside_temp: Option<f32>,
    ) -> AcControlMessage {
        bridge::derive_message(&self.state, self.hysteresis, summer_threshold, outside_temp)
    }

    pub fn status(&self, test_schedule: bool) -> StatusView {
        StatusView::from_control(&self.state, test_schedule)
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState::from_control(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CalibrationSettings, TempScale};
    use crate::schedule::{ScheduleDoc, ScheduleMode};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn identity_calibration() -> CalibrationProfile {
        CalibrationProfile::new(
            TempScale::Metric,
            &CalibrationSettings {
                elevation: 0.0,
                boiling_measured: 100.0,
                freezing_measured: 0.01,
            },
        )
        .unwrap()
    }

    fn limits() -> SetpointLimits {
        SetpointLimits {
            min_temp: 15.0,
            max_temp: 30.0,
            temp_step: 0.5,
        }
    }

    fn engine(initial: ControlState) -> ControlEngine {
        ControlEngine::new(identity_calibration(), limits(), 0.5, 0.1, initial)
    }

    fn monday(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        // 2026-01-05 is a Monday.
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 5, hour, minute, 0)
            .unwrap()
    }

    fn heat_table(doc_json: &str) -> ScheduleTable {
        let doc: ScheduleDoc = serde_json::from_str(doc_json).unwrap();
        ScheduleTable::from_doc(&doc, ScheduleMode::Heat, &limits()).unwrap()
    }

    #[test]
    fn first_reading_always_reports() {
        let mut engine = engine(ControlState::new(22.0, 22.0));
        let event = engine.update_sensor(Some(21.43));
        assert_eq!(event, Some(StateEvent::TemperatureChanged(21.4)));
    }

    #[test]
    fn small_drift_is_filtered() {
        let mut engine = engine(ControlState::new(22.0, 22.0));
        engine.update_sensor(Some(22.0));
        assert_eq!(engine.update_sensor(Some(22.05)), None);
        assert!(engine.update_sensor(Some(22.2)).is_some());
    }

    #[test]
    fn unavailable_sensor_keeps_last_value_and_relays_running() {
        let mut initial = ControlState::new(22.0, 22.0);
        initial.heat = true;
        let mut engine = engine(initial);

        engine.update_sensor(Some(21.0));
        engine.evaluate_relays();
        assert!(engine.state().relay_heat);

        // Three consecutive failed reads: no crash, no temperature event,
        // relays still recomputed from the last value.
        for _ in 0..3 {
            assert_eq!(engine.update_sensor(None), None);
            assert!(engine.evaluate_relays().is_empty());
            assert_eq!(engine.state().current_temp, 21.0);
            assert!(engine.state().relay_heat);
        }
    }

    #[test]
    fn comparisons_use_unrounded_temperature() {
        // Corrected 21.96 rounds to 22.0 for display, but 22.0 <= 21.96 is
        // false, so the heat relay must stay on.
        let mut initial = ControlState::new(22.0, 20.0);
        initial.heat = true;
        initial.relay_heat = true;
        initial.relay_fan = true;
        let mut engine = engine(initial);

        engine.update_sensor(Some(21.96));
        assert_eq!(engine.state().current_temp, 22.0);
        engine.evaluate_relays();
        assert!(engine.state().relay_heat);

        engine.update_sensor(Some(22.0));
        engine.evaluate_relays();
        assert!(!engine.state().relay_heat);
    }

    #[test]
    fn schedule_fires_through_setpoint_path() {
        let mut initial = ControlState::new(22.0, 21.0);
        initial.heat = true;
        let mut engine = engine(initial);
        engine.install_schedule(Some(heat_table(
            r#"{"heat": {"monday": [["06:30", 19.5]]}}"#,
        )));

        assert!(engine.run_schedule(monday(6, 0)).is_empty());
        let events = engine.run_schedule(monday(6, 45));
        assert_eq!(events, vec![StateEvent::ScheduleSetpoint(19.5)]);
        assert_eq!(engine.state().set_temp, 19.5);
    }

    #[test]
    fn hold_suppresses_schedule_firing() {
        let mut initial = ControlState::new(22.0, 21.0);
        initial.heat = true;
        initial.hold = true;
        let mut engine = engine(initial);
        engine.install_schedule(Some(heat_table(
            r#"{"heat": {"monday": [["06:30", 19.5]]}}"#,
        )));

        assert!(engine.run_schedule(monday(6, 0)).is_empty());
        assert!(engine.run_schedule(monday(7, 0)).is_empty());
        assert_eq!(engine.state().set_temp, 22.0);
    }

    #[test]
    fn mode_switch_drops_old_table() {
        let mut initial = ControlState::new(22.0, 21.0);
        initial.heat = true;
        let mut engine = engine(initial);
        engine.install_schedule(Some(heat_table(
            r#"{"heat": {"monday": [["06:30", 19.5]]}}"#,
        )));
        engine.run_schedule(monday(6, 0));

        // Switch to cool: reload is clear-then-load, the heat entry is gone.
        engine
            .apply_command(Command {
                cool: Some(true),
                ..Command::default()
            })
            .unwrap();
        engine.install_schedule(None);

        assert!(engine.run_schedule(monday(7, 0)).is_empty());
        assert_eq!(engine.state().set_temp, 22.0);
    }

    #[test]
    fn command_then_relays_then_persist_view() {
        let mut engine = engine(ControlState::new(20.0, 22.0));
        engine.update_sensor(Some(18.0));

        let outcome = engine
            .apply_command(Command {
                heat: Some(true),
                ..Command::default()
            })
            .unwrap();
        assert!(outcome.reload_schedule);

        let events = engine.evaluate_relays();
        assert!(!events.is_empty());
        assert!(engine.state().relay_heat);

        let persisted = engine.persisted();
        assert_eq!(persisted.heat_control, "down");

        let status = engine.status(false);
        assert_eq!(status.heat, "On");
        assert_eq!(status.sched, "Heat");
    }
}
