/// MQTT topic set built from the configured publish prefix and client id,
/// matching the original controller's topic scheme.
#[derive(Debug, Clone)]
pub struct Topics {
    pub cmd_restart: String,
    pub cmd_loglevel: String,
    pub cmd_version: String,
    pub cmd_state: String,
    pub pub_status: String,
    pub pub_fan_state: String,
    pub pub_version: String,
}

impl Topics {
    pub fn new(prefix: &str, client_id: &str) -> Self {
        Self {
            cmd_restart: format!("{prefix}/{client_id}/command/restart"),
            cmd_loglevel: format!("{prefix}/{client_id}/command/loglevel"),
            cmd_version: format!("{prefix}/{client_id}/command/version"),
            cmd_state: format!("{prefix}/{client_id}/command/state"),
            pub_status: format!("{prefix}/{client_id}/state/status"),
            pub_fan_state: format!("{prefix}/{client_id}/state/fan"),
            pub_version: format!("{prefix}/{client_id}/state/version"),
        }
    }

    pub fn subscriptions(&self) -> [&str; 4] {
        [
            &self.cmd_restart,
            &self.cmd_loglevel,
            &self.cmd_version,
            &self.cmd_state,
        ]
    }
}

/// Companion-unit command topic (shared broker namespace, no prefix).
pub fn companion_command(name: &str) -> String {
    format!("command/{name}")
}

pub fn companion_control(name: &str) -> String {
    format!("command/{name}/control")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn topics_follow_prefix_and_client_id() {
        let topics = Topics::new("thermostat", "thermostat1");
        assert_eq!(topics.cmd_restart, "thermostat/thermostat1/command/restart");
        assert_eq!(topics.pub_status, "thermostat/thermostat1/state/status");
        assert_eq!(topics.subscriptions().len(), 4);
    }

    #[test]
    fn companion_topics_are_unprefixed() {
        assert_eq!(companion_command("GuestAC"), "command/GuestAC");
        assert_eq!(companion_control("GuestAC"), "command/GuestAC/control");
    }
}
