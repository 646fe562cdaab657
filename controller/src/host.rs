use std::{
    collections::HashMap,
    io::ErrorKind,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{Offset, Utc};
use chrono_tz::Tz;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use serde::Serialize;
use tokio::{
    net::TcpListener,
    sync::{watch, Mutex},
};
use tracing::{error, info, warn};
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

use hvac_common::{
    companion_command, companion_control, CalibrationProfile, Command, ControlEngine,
    ControlError, ControlState, PersistedState, RelayEvent, RelayOutputs, ScheduleDoc,
    ScheduleMode, ScheduleTable, Settings, StateEvent, Topics,
};

use crate::hw::{self, RelayBank, TemperatureProbe};

/// How the process ends; `Restart` maps to the supervisor restart exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Normal,
    Restart,
}

#[derive(Clone)]
struct AppState {
    engine: Arc<Mutex<ControlEngine>>,
    settings: Arc<Settings>,
    topics: Arc<Topics>,
    outside: Arc<Mutex<Option<OutsideSample>>>,
    mqtt: MqttHandle,
    store: AppStore,
    log_filter: reload::Handle<EnvFilter, Registry>,
    shutdown: watch::Sender<Option<Exit>>,
}

#[derive(Clone, Copy)]
struct OutsideSample {
    temp: f32,
    at: Instant,
}

/// Publishing no-ops when MQTT is disabled in the settings.
#[derive(Clone)]
struct MqttHandle(Option<AsyncClient>);

impl MqttHandle {
    async fn publish(&self, topic: &str, retain: bool, payload: Vec<u8>) {
        if let Some(client) = &self.0 {
            if let Err(err) = client
                .publish(topic, QoS::AtLeastOnce, retain, payload)
                .await
            {
                warn!("mqtt publish on {topic} failed: {err}");
            }
        }
    }

    async fn disconnect(&self) {
        if let Some(client) = &self.0 {
            let _ = client.disconnect().await;
        }
    }
}

#[derive(Clone)]
struct AppStore {
    settings_path: Arc<PathBuf>,
    state_path: Arc<PathBuf>,
    schedule_path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

const MAX_MQTT_PAYLOAD_BYTES: usize = 512;
const OUTSIDE_STALE_AFTER: Duration = Duration::from_secs(300);
const STATUS_PUBLISH_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_SET_TEMP: f32 = 20.0;

pub async fn run() -> anyhow::Result<Exit> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, log_filter) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = AppStore::new();
    let settings = store.load_settings().await.unwrap_or_else(|err| {
        warn!("failed to load settings from store: {err:#}");
        Settings::default()
    });
    settings.validate().context("invalid settings")?;
    let settings = Arc::new(settings);

    let calibration = CalibrationProfile::new(settings.scale, &settings.calibration)
        .context("invalid calibration")?;

    let persisted = store.load_state().await.unwrap_or_else(|err| {
        warn!("failed to load control state from store: {err:#}");
        PersistedState::from_control(&ControlState::new(DEFAULT_SET_TEMP, DEFAULT_SET_TEMP))
    });
    // Placeholder current temperature until the first probe read lands; the
    // control loop reads the probe before it ever evaluates relays.
    let initial = persisted.clone().into_control(persisted.set_temp);

    let engine = ControlEngine::new(
        calibration,
        settings.thermostat.limits(),
        settings.thermostat.temp_hysteresis,
        settings.scale.tolerance(),
        initial,
    );

    let topics = Arc::new(Topics::new(
        &settings.mqtt.pub_prefix,
        &settings.mqtt.client_id,
    ));

    let (mqtt, eventloop) = if settings.mqtt.enabled {
        let host = std::env::var("MQTT_HOST").unwrap_or_else(|_| settings.mqtt.server.clone());
        let port = std::env::var("MQTT_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(settings.mqtt.port);
        let mut options = MqttOptions::new(settings.mqtt.client_id.clone(), host, port);
        options.set_keep_alive(Duration::from_secs(30));
        let (client, eventloop) = AsyncClient::new(options, 64);
        (MqttHandle(Some(client)), Some(eventloop))
    } else {
        (MqttHandle(None), None)
    };

    let (shutdown, mut shutdown_rx) = watch::channel(None::<Exit>);

    let app_state = AppState {
        engine: Arc::new(Mutex::new(engine)),
        settings: settings.clone(),
        topics,
        outside: Arc::new(Mutex::new(None)),
        mqtt,
        store,
        log_filter,
        shutdown,
    };

    reload_schedule(&app_state).await;

    if let Some(eventloop) = eventloop {
        subscribe_topics(&app_state).await?;
        spawn_mqtt_loop(app_state.clone(), eventloop);
        spawn_status_publish_loop(app_state.clone());
    }

    let probe = hw::build_probe(&settings.probe, settings.scale);
    let relays = hw::build_relay_bank(
        settings.thermostat.heat_pin,
        settings.thermostat.cool_pin,
        settings.thermostat.fan_pin,
    );
    spawn_control_loop(app_state.clone(), probe, relays);

    {
        let shutdown = app_state.shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
                let _ = shutdown.send(Some(Exit::Normal));
            }
        });
    }

    let app = Router::new()
        .route("/api/status", get(handle_get_status))
        .route("/api/set", post(handle_set))
        .route(
            "/api/schedule",
            get(handle_get_schedule).put(handle_put_schedule),
        )
        .with_state(app_state.clone());

    let port = std::env::var("HVAC_HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("0.0.0.0:{port}")
        .parse()
        .context("invalid listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind controller server at {addr}"))?;

    info!("controller listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|exit| exit.is_some()).await;
        })
        .await?;

    if let Err(err) = persist_state(&app_state).await {
        error!("final state persist failed: {err:#}");
    }
    app_state.mqtt.disconnect().await;

    let exit = (*app_state.shutdown.borrow()).unwrap_or(Exit::Normal);
    info!("controller exiting ({exit:?})");
    Ok(exit)
}

async fn subscribe_topics(app_state: &AppState) -> anyhow::Result<()> {
    let Some(client) = &app_state.mqtt.0 else {
        return Ok(());
    };
    for topic in app_state.topics.subscriptions() {
        client.subscribe(topic, QoS::AtMostOnce).await?;
    }
    if let Some(topic) = &app_state.settings.mqtt.outside_topic {
        client.subscribe(topic, QoS::AtMostOnce).await?;
    }
    Ok(())
}

fn spawn_mqtt_loop(app_state: AppState, mut eventloop: rumqttc::EventLoop) {
    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::Publish(message))) => {
                    handle_mqtt_message(&app_state, &message.topic, message.payload.to_vec())
                        .await;
                }
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    info!("mqtt connected");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("mqtt poll error: {err}");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    });
}

fn spawn_control_loop(
    app_state: AppState,
    mut probe: Box<dyn TemperatureProbe>,
    mut relays: Box<dyn RelayBank>,
) {
    let mut shutdown_rx = app_state.shutdown.subscribe();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(
            app_state.settings.thermostat.temp_check_interval_s,
        ));
        let mut last_persisted: Option<PersistedState> = None;
        let mut last_bridge: Option<serde_json::Value> = None;

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown_rx.changed() => break,
            }

            // A DS18B20 conversion blocks for most of a second; keep that
            // off the async worker.
            let (reading, returned) = match tokio::task::spawn_blocking(move || {
                let reading = probe.read();
                (reading, probe)
            })
            .await
            {
                Ok(result) => result,
                Err(err) => {
                    error!("probe task failed: {err}");
                    break;
                }
            };
            probe = returned;
            let raw = match reading {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!("probe read failed: {err}");
                    None
                }
            };
            let now = now_in_timezone(&app_state.settings.timezone);
            let outside = outside_temp(&app_state).await;

            let (outputs, persisted, bridge) = {
                let mut engine = app_state.engine.lock().await;

                if let Some(StateEvent::TemperatureChanged(temp)) = engine.update_sensor(raw) {
                    info!("temperature changed to {temp:.1}");
                }
                if let Some(now) = now {
                    for event in engine.run_schedule(now) {
                        if let StateEvent::ScheduleSetpoint(temp) = event {
                            info!("schedule set temperature to {temp:.1}");
                        }
                    }
                }
                for event in engine.evaluate_relays() {
                    log_relay_event(event);
                }

                let bridge = app_state.settings.bridge.enabled.then(|| {
                    engine.derive_ac_message(app_state.settings.bridge.summer_threshold, outside)
                });
                (engine.relay_outputs(), engine.persisted(), bridge)
            };

            if let Err(err) = relays.apply(outputs) {
                warn!("relay apply failed: {err}");
            }

            if last_persisted.as_ref() != Some(&persisted) {
                match app_state.store.save_state(&persisted).await {
                    Ok(()) => last_persisted = Some(persisted),
                    Err(err) => error!("state persist failed: {err:#}"),
                }
            }

            if let Some(message) = bridge {
                let state_payload = message.state_payload();
                if last_bridge.as_ref() != Some(&state_payload) {
                    let name = &app_state.settings.bridge.name;
                    app_state
                        .mqtt
                        .publish(&companion_command(name), false, state_payload.to_string().into_bytes())
                        .await;
                    app_state
                        .mqtt
                        .publish(
                            &companion_control(name),
                            false,
                            message.control_payload().to_string().into_bytes(),
                        )
                        .await;
                    last_bridge = Some(state_payload);
                }
            }
        }

        // Relays open on the way out.
        if let Err(err) = relays.apply(RelayOutputs::default()) {
            warn!("relay release failed: {err}");
        }
    });
}

fn spawn_status_publish_loop(app_state: AppState) {
    let mut shutdown_rx = app_state.shutdown.subscribe();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATUS_PUBLISH_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown_rx.changed() => break,
            }
            publish_status(&app_state).await;
        }
    });
}

async fn publish_status(app_state: &AppState) {
    let status = {
        let engine = app_state.engine.lock().await;
        engine.status(app_state.settings.use_test_schedule)
    };

    match serde_json::to_vec(&status) {
        Ok(body) => {
            app_state
                .mqtt
                .publish(&app_state.topics.pub_status, true, body)
                .await;
        }
        Err(err) => warn!("status serialization failed: {err}"),
    }
    app_state
        .mqtt
        .publish(
            &app_state.topics.pub_fan_state,
            true,
            status.fan.as_bytes().to_vec(),
        )
        .await;
}

async fn handle_mqtt_message(app_state: &AppState, topic: &str, payload: Vec<u8>) {
    if payload.len() > MAX_MQTT_PAYLOAD_BYTES {
        warn!(
            "dropping oversized MQTT payload on topic {} ({} bytes)",
            topic,
            payload.len()
        );
        return;
    }
    let Ok(message) = String::from_utf8(payload) else {
        warn!("non utf8 mqtt payload on topic {topic}");
        return;
    };

    let topics = &app_state.topics;
    if topic == topics.cmd_restart {
        info!("restart command received");
        let _ = app_state.shutdown.send(Some(Exit::Restart));
    } else if topic == topics.cmd_loglevel {
        let level = message.trim().to_ascii_lowercase();
        match log_directive(&level) {
            Some(directive) => {
                match app_state.log_filter.reload(EnvFilter::new(directive)) {
                    Ok(()) => info!("log level set to {level}"),
                    Err(err) => warn!("log level reload failed: {err}"),
                }
            }
            None => warn!("unknown log level {message:?}"),
        }
    } else if topic == topics.cmd_version {
        app_state
            .mqtt
            .publish(
                &topics.pub_version,
                true,
                env!("CARGO_PKG_VERSION").as_bytes().to_vec(),
            )
            .await;
    } else if topic == topics.cmd_state {
        publish_status(app_state).await;
    } else if Some(topic) == app_state.settings.mqtt.outside_topic.as_deref() {
        record_outside_sample(app_state, &message).await;
    }
}

async fn record_outside_sample(app_state: &AppState, message: &str) {
    let temp = serde_json::from_str::<serde_json::Value>(message)
        .ok()
        .and_then(|doc| doc.get(&app_state.settings.mqtt.outside_key).cloned())
        .and_then(|value| value.as_f64())
        .map(|value| value as f32);

    match temp {
        Some(temp) if temp.is_finite() => {
            let mut outside = app_state.outside.lock().await;
            *outside = Some(OutsideSample {
                temp,
                at: Instant::now(),
            });
        }
        _ => warn!("unusable outside conditions payload: {message:?}"),
    }
}

async fn outside_temp(app_state: &AppState) -> Option<f32> {
    let sample = (*app_state.outside.lock().await)?;
    (sample.at.elapsed() <= OUTSIDE_STALE_AFTER).then_some(sample.temp)
}

async fn handle_get_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = {
        let engine = state.engine.lock().await;
        engine.status(state.settings.use_test_schedule)
    };
    Json(status)
}

async fn handle_set(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let command = match command_from_params(&params) {
        Ok(command) => command,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let outcome = {
        let mut engine = state.engine.lock().await;
        engine.apply_command(command)
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err @ ControlError::Validation(_)) => {
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
        Err(err) => {
            warn!("command failed: {err}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Command failed");
        }
    };

    for event in &outcome.events {
        info!("command applied: {event:?}");
    }
    if outcome.reload_schedule {
        reload_schedule(&state).await;
    }
    if let Err(err) = persist_state(&state).await {
        error!("failed to persist control state: {err:#}");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to persist control state",
        );
    }

    handle_get_status(State(state)).await.into_response()
}

async fn handle_get_schedule(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.load_schedule_doc().await {
        Ok(doc) => Json(doc).into_response(),
        Err(err) => {
            warn!("failed to load schedule: {err:#}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load schedule")
        }
    }
}

async fn handle_put_schedule(
    State(state): State<AppState>,
    Json(doc): Json<ScheduleDoc>,
) -> impl IntoResponse {
    let limits = state.settings.thermostat.limits();
    for mode in [ScheduleMode::Heat, ScheduleMode::Cool] {
        if let Err(err) = ScheduleTable::from_doc(&doc, mode, &limits) {
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    }

    if let Err(err) = state.store.save_schedule_doc(&doc).await {
        error!("failed to persist schedule: {err:#}");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to persist schedule",
        );
    }
    reload_schedule(&state).await;

    Json(doc).into_response()
}

/// Rebuilds the installed schedule table from the stored document and the
/// currently active mode. Replacement is clear-then-load: whatever was
/// installed before can never fire again.
async fn reload_schedule(app_state: &AppState) {
    let limits = app_state.settings.thermostat.limits();
    let mut engine = app_state.engine.lock().await;

    let mode = {
        let state = engine.state();
        if state.heat {
            Some(ScheduleMode::Heat)
        } else if state.cool {
            Some(ScheduleMode::Cool)
        } else {
            None
        }
    };

    let table = match mode {
        None => None,
        Some(_) if app_state.settings.use_test_schedule => {
            Some(ScheduleTable::synthetic(app_state.settings.scale))
        }
        Some(mode) => match app_state.store.load_schedule_doc().await {
            Ok(doc) => match ScheduleTable::from_doc(&doc, mode, &limits) {
                Ok(table) if !table.is_empty() => Some(table),
                Ok(_) => None,
                Err(err) => {
                    warn!("stored schedule rejected: {err}");
                    None
                }
            },
            Err(err) => {
                warn!("schedule load failed: {err:#}");
                None
            }
        },
    };

    match &table {
        Some(table) => info!("schedule installed with {} entries", table.len()),
        None => info!("schedule cleared"),
    }
    engine.install_schedule(table);
}

async fn persist_state(app_state: &AppState) -> anyhow::Result<()> {
    let persisted = {
        let engine = app_state.engine.lock().await;
        engine.persisted()
    };
    app_state.store.save_state(&persisted).await
}

impl AppStore {
    fn new() -> Self {
        let data_dir = std::env::var("HVAC_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.hvac"));

        Self {
            settings_path: Arc::new(data_dir.join("settings.json")),
            state_path: Arc::new(data_dir.join("state.json")),
            schedule_path: Arc::new(data_dir.join("schedule.json")),
            lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load_settings(&self) -> anyhow::Result<Settings> {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(self.settings_path.as_ref()).await {
            Ok(raw) => Ok(serde_json::from_slice::<Settings>(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Settings::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn load_state(&self) -> anyhow::Result<PersistedState> {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(self.state_path.as_ref()).await {
            Ok(raw) => Ok(serde_json::from_slice::<PersistedState>(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(PersistedState::from_control(
                &ControlState::new(DEFAULT_SET_TEMP, DEFAULT_SET_TEMP),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn save_state(&self, state: &PersistedState) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.state_path.as_ref().clone();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(state)?;
        tokio::fs::write(path, payload).await?;
        Ok(())
    }

    async fn load_schedule_doc(&self) -> anyhow::Result<ScheduleDoc> {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(self.schedule_path.as_ref()).await {
            Ok(raw) => Ok(serde_json::from_slice::<ScheduleDoc>(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(ScheduleDoc::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save_schedule_doc(&self, doc: &ScheduleDoc) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.schedule_path.as_ref().clone();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(doc)?;
        tokio::fs::write(path, payload).await?;
        Ok(())
    }
}

fn command_from_params(params: &HashMap<String, String>) -> Result<Command, &'static str> {
    let mut command = Command::default();
    let mut recognized = false;

    if let Some(value) = params.get("temp") {
        let Ok(temp) = value.parse::<f32>() else {
            return Err("Invalid 'temp' value");
        };
        command.set_temp = Some(temp);
        recognized = true;
    }
    for (name, slot) in [
        ("heat", &mut command.heat),
        ("cool", &mut command.cool),
        ("fan", &mut command.fan),
        ("hold", &mut command.hold),
    ] {
        if let Some(value) = params.get(name) {
            let Some(flag) = parse_flag(value) else {
                return Err("Invalid flag value. Use 'on' or 'off'");
            };
            *slot = Some(flag);
            recognized = true;
        }
    }

    if recognized {
        Ok(command)
    } else {
        Err("No recognized parameters. Use temp, heat, cool, fan, hold")
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn log_directive(level: &str) -> Option<&'static str> {
    match level {
        "debug" => Some("debug"),
        // The original firmware's STATE level sits between info and debug;
        // info carries the same transitions here.
        "info" | "state" => Some("info"),
        "error" => Some("error"),
        _ => None,
    }
}

fn log_relay_event(event: RelayEvent) {
    let (relay, on) = match event {
        RelayEvent::Heat(on) => ("heat", on),
        RelayEvent::Cool(on) => ("cool", on),
        RelayEvent::Fan(on) => ("fan", on),
    };
    info!("{relay} relay {}", if on { "closed" } else { "open" });
}

fn now_in_timezone(timezone: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    let tz: Tz = timezone.parse().ok()?;
    let local = Utc::now().with_timezone(&tz);
    Some(local.with_timezone(&local.offset().fix()))
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn builds_command_from_query_params() {
        let command =
            command_from_params(&params(&[("temp", "21.5"), ("heat", "on"), ("fan", "off")]))
                .unwrap();
        assert_eq!(command.set_temp, Some(21.5));
        assert_eq!(command.heat, Some(true));
        assert_eq!(command.fan, Some(false));
        assert_eq!(command.cool, None);
        assert_eq!(command.hold, None);
    }

    #[test]
    fn rejects_unknown_flag_values() {
        assert!(command_from_params(&params(&[("heat", "maybe")])).is_err());
        assert!(command_from_params(&params(&[("temp", "warm")])).is_err());
    }

    #[test]
    fn rejects_empty_command() {
        assert!(command_from_params(&params(&[])).is_err());
        assert!(command_from_params(&params(&[("volume", "11")])).is_err());
    }

    #[test]
    fn flag_parsing_accepts_common_spellings() {
        assert_eq!(parse_flag("On"), Some(true));
        assert_eq!(parse_flag("FALSE"), Some(false));
        assert_eq!(parse_flag("2"), None);
    }

    #[test]
    fn log_levels_map_to_directives() {
        assert_eq!(log_directive("debug"), Some("debug"));
        assert_eq!(log_directive("state"), Some("info"));
        assert_eq!(log_directive("verbose"), None);
    }
}
