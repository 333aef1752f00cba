use serde::{Deserialize, Serialize};

/// A command sent to the light controller embedded in a device.
///
/// Tokens are case-sensitive: `on`, `off`, and `status` are the only
/// accepted spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandToken {
    /// Turns the indicator light on.
    #[serde(rename = "on")]
    On,
    /// Turns the indicator light off.
    #[serde(rename = "off")]
    Off,
    /// Asks the device for the current state of its indicator light.
    #[serde(rename = "status")]
    StatusQuery,
}

impl CommandToken {
    /// Parses a raw command token.
    ///
    /// Returns [`None`] for every token which is not exactly `on`, `off`,
    /// or `status`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            "status" => Some(Self::StatusQuery),
            _ => None,
        }
    }

    /// Returns the token as written in a request path.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::StatusQuery => "status",
        }
    }

    /// Returns the route, relative to the device endpoint, which executes
    /// this command.
    #[must_use]
    pub const fn device_route(&self) -> &'static str {
        match self {
            Self::On => "switchon",
            Self::Off => "switchoff",
            Self::StatusQuery => "status",
        }
    }

    /// Whether the command changes the state of the actuator.
    #[must_use]
    pub const fn is_toggle(&self) -> bool {
        matches!(self, Self::On | Self::Off)
    }
}

impl std::fmt::Display for CommandToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{deserialize, serialize};

    use super::CommandToken;

    #[test]
    fn parse_accepted_tokens() {
        for command in [CommandToken::On, CommandToken::Off, CommandToken::StatusQuery] {
            assert_eq!(CommandToken::parse(command.as_str()), Some(command));
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(CommandToken::parse("ON"), None);
        assert_eq!(CommandToken::parse("Off"), None);
        assert_eq!(CommandToken::parse(" status"), None);
    }

    #[test]
    fn parse_rejects_unknown_tokens() {
        assert_eq!(CommandToken::parse("spin"), None);
        assert_eq!(CommandToken::parse(""), None);
        assert_eq!(CommandToken::parse("switchon"), None);
    }

    #[test]
    fn device_routes() {
        assert_eq!(CommandToken::On.device_route(), "switchon");
        assert_eq!(CommandToken::Off.device_route(), "switchoff");
        assert_eq!(CommandToken::StatusQuery.device_route(), "status");
    }

    #[test]
    fn toggle_commands() {
        assert!(CommandToken::On.is_toggle());
        assert!(CommandToken::Off.is_toggle());
        assert!(!CommandToken::StatusQuery.is_toggle());
    }

    #[test]
    fn serde_uses_path_spelling() {
        assert_eq!(serialize(CommandToken::StatusQuery), json!("status"));
        assert_eq!(deserialize::<CommandToken>(json!("off")), CommandToken::Off);
    }
}
