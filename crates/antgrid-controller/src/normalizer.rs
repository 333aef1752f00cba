use antgrid::command::CommandToken;
use antgrid::status::NormalizedStatus;

use serde_json::Value;

use tracing::debug;

use crate::dispatcher::DeviceReply;

// Field names which carry the state of the light in the known firmware
// replies.
const INDICATOR_FIELDS: &[&str] = &["status", "state", "led", "on", "value", "results"];

/// Interprets the raw reply of a device as a [`NormalizedStatus`].
///
/// Normalization must be a pure function of the reply.
pub trait StatusNormalizer: std::fmt::Debug + Send + Sync {
    /// Classifies a [`DeviceReply`].
    fn normalize(&self, reply: &DeviceReply) -> NormalizedStatus;
}

/// The normalizer for the current light controller firmware, whose reply
/// schema is not documented.
///
/// The classification is a substring heuristic and is known to be fragile:
///
/// - A JSON object or array whose serialized form contains `true` is
///   [`NormalizedStatus::On`], wherever `true` appears.
/// - Otherwise, a JSON value carrying a recognizable indicator is
///   [`NormalizedStatus::Off`]. Indicators are `false` values, `off`
///   strings, and the `status`, `state`, `led`, `on`, `value`, and `results`
///   fields.
/// - A JSON value without any indicator, such as `{"foo":"bar"}`, is
///   [`NormalizedStatus::Unknown`].
/// - A reply which is not JSON is matched against the plain-text
///   conventions `on`/`true`/`1` and `off`/`false`/`0`, ignoring case and
///   surrounding whitespace. Anything else is [`NormalizedStatus::Unknown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeuristicNormalizer;

impl StatusNormalizer for HeuristicNormalizer {
    fn normalize(&self, reply: &DeviceReply) -> NormalizedStatus {
        match serde_json::from_str::<Value>(reply.body()) {
            Ok(value) => classify_json(&value),
            Err(_) => classify_text(reply.body()),
        }
    }
}

fn classify_json(value: &Value) -> NormalizedStatus {
    match value {
        Value::Bool(true) => NormalizedStatus::On,
        Value::Bool(false) => NormalizedStatus::Off,
        Value::Number(number) => match number.as_u64() {
            Some(1) => NormalizedStatus::On,
            Some(0) => NormalizedStatus::Off,
            _ => NormalizedStatus::Unknown,
        },
        Value::String(text) => classify_text(text),
        Value::Null => NormalizedStatus::Unknown,
        Value::Array(_) | Value::Object(_) => {
            if value.to_string().contains("true") {
                NormalizedStatus::On
            } else if has_indicator(value) {
                NormalizedStatus::Off
            } else {
                NormalizedStatus::Unknown
            }
        }
    }
}

fn classify_text(text: &str) -> NormalizedStatus {
    let text = text.trim();
    if ["on", "true", "1"]
        .iter()
        .any(|word| text.eq_ignore_ascii_case(word))
    {
        NormalizedStatus::On
    } else if ["off", "false", "0"]
        .iter()
        .any(|word| text.eq_ignore_ascii_case(word))
    {
        NormalizedStatus::Off
    } else {
        NormalizedStatus::Unknown
    }
}

fn has_indicator(value: &Value) -> bool {
    match value {
        Value::Bool(false) => true,
        Value::String(text) => {
            text.eq_ignore_ascii_case("false") || text.eq_ignore_ascii_case("off")
        }
        Value::Array(values) => values.iter().any(has_indicator),
        Value::Object(fields) => fields.iter().any(|(name, value)| {
            INDICATOR_FIELDS
                .iter()
                .any(|field| name.eq_ignore_ascii_case(field))
                || has_indicator(value)
        }),
        Value::Bool(true) | Value::Number(_) | Value::Null => false,
    }
}

/// Returns the first element of the `results` array of a JSON reply.
#[must_use]
pub fn first_result(reply: &DeviceReply) -> Option<Value> {
    let value = serde_json::from_str::<Value>(reply.body()).ok()?;
    value.get("results")?.as_array()?.first().cloned()
}

// The first result only serves diagnostics.
pub(crate) fn log_first_result(device_id: &str, command: CommandToken, reply: &DeviceReply) {
    if let Some(result) = first_result(reply) {
        debug!(device_id, %command, %result, "Device result");
    }
}

#[cfg(test)]
mod tests {
    use antgrid::status::NormalizedStatus;

    use serde_json::json;

    use crate::dispatcher::DeviceReply;

    use super::{HeuristicNormalizer, StatusNormalizer, first_result};

    fn normalize(body: &str) -> NormalizedStatus {
        HeuristicNormalizer.normalize(&DeviceReply::new(200, body))
    }

    #[test]
    fn json_containing_true_is_on() {
        assert_eq!(normalize(r#"{"status":"true"}"#), NormalizedStatus::On);
        assert_eq!(normalize(r#"{"led":true}"#), NormalizedStatus::On);
        assert_eq!(normalize(r#"{"results":[true]}"#), NormalizedStatus::On);
        assert_eq!(
            normalize(r#"{"device":{"light":{"enabled":true}}}"#),
            NormalizedStatus::On
        );
    }

    #[test]
    fn json_with_indicator_is_off() {
        assert_eq!(normalize(r#"{"status":"false"}"#), NormalizedStatus::Off);
        assert_eq!(normalize(r#"{"led":false}"#), NormalizedStatus::Off);
        assert_eq!(normalize(r#"{"state":"off"}"#), NormalizedStatus::Off);
        assert_eq!(normalize(r#"{"results":["LED off"]}"#), NormalizedStatus::Off);
        assert_eq!(normalize(r#"{"status":0}"#), NormalizedStatus::Off);
    }

    #[test]
    fn json_without_indicator_is_unknown() {
        assert_eq!(normalize(r#"{"foo":"bar"}"#), NormalizedStatus::Unknown);
        assert_eq!(normalize("{}"), NormalizedStatus::Unknown);
        assert_eq!(normalize("[]"), NormalizedStatus::Unknown);
        assert_eq!(normalize("null"), NormalizedStatus::Unknown);
    }

    #[test]
    fn field_order_does_not_matter() {
        assert_eq!(
            normalize(r#"{"uptime":12,"status":"true","firmware":"1.0"}"#),
            normalize(r#"{"firmware":"1.0","status":"true","uptime":12}"#),
        );
        assert_eq!(
            normalize(r#"{"foo":"bar","led":false}"#),
            normalize(r#"{"led":false,"foo":"bar"}"#),
        );
    }

    #[test]
    fn json_scalars() {
        assert_eq!(normalize("true"), NormalizedStatus::On);
        assert_eq!(normalize("false"), NormalizedStatus::Off);
        assert_eq!(normalize("1"), NormalizedStatus::On);
        assert_eq!(normalize("0"), NormalizedStatus::Off);
        assert_eq!(normalize("42"), NormalizedStatus::Unknown);
        assert_eq!(normalize(r#""ON""#), NormalizedStatus::On);
    }

    #[test]
    fn plain_text_conventions() {
        assert_eq!(normalize("on"), NormalizedStatus::On);
        assert_eq!(normalize(" On\n"), NormalizedStatus::On);
        assert_eq!(normalize("OFF"), NormalizedStatus::Off);
        assert_eq!(normalize("LED is on"), NormalizedStatus::Unknown);
        assert_eq!(normalize("<html>"), NormalizedStatus::Unknown);
        assert_eq!(normalize(""), NormalizedStatus::Unknown);
    }

    #[test]
    fn first_result_of_reply() {
        assert_eq!(
            first_result(&DeviceReply::new(200, r#"{"results":["LED on", "ok"]}"#)),
            Some(json!("LED on"))
        );
        assert_eq!(
            first_result(&DeviceReply::new(200, r#"{"results":[]}"#)),
            None
        );
        assert_eq!(first_result(&DeviceReply::new(200, "on")), None);
    }
}
