use crate::foundation::util::encoding::normalize_signature_hex;
use crate::foundation::util::units::parse_ether;
use crate::foundation::{CovaultError, UserId};
use alloy_primitives::U256;
use log::debug;
use serde::Deserialize;

/// External interaction proof binding a request to an authorized action.
///
/// The payload is opaque bytes as far as authorization goes: it is forwarded
/// to the cohort's condition evaluator verbatim and never executed here. The
/// only local processing is the best-effort override extraction below.
#[derive(Clone, Debug)]
pub struct AuthorizationProof {
    pub timestamp: u64,
    /// Normalized hex, no `0x` prefix; format-validated at construction.
    pub signature: String,
    pub payload: String,
}

impl AuthorizationProof {
    pub fn new(timestamp: u64, signature: &str, payload: &serde_json::Value) -> Result<Self, CovaultError> {
        let signature = normalize_signature_hex(signature)?;
        let payload = match payload {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(Self { timestamp, signature, payload })
    }
}

/// Typed result of payload reinterpretation: values that take precedence
/// over the caller-supplied target/amount when present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferOverride {
    pub receiver_id: Option<UserId>,
    pub amount_wei: Option<U256>,
}

impl TransferOverride {
    pub fn is_empty(&self) -> bool {
        self.receiver_id.is_none() && self.amount_wei.is_none()
    }
}

// Schema of the interaction payload's command envelope. Validated at this
// boundary; the orchestrator only ever sees the typed `TransferOverride`.
#[derive(Debug, Deserialize)]
struct Interaction {
    data: Option<CommandData>,
}

#[derive(Debug, Deserialize)]
struct CommandData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    options: Vec<CommandOption>,
}

#[derive(Debug, Deserialize)]
struct CommandOption {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    options: Vec<CommandOption>,
}

const SEND_COMMANDS: &[&str] = &["send", "transfer", "tip"];
const RECEIVER_OPTIONS: &[&str] = &["to", "user", "recipient", "receiver"];
const AMOUNT_OPTIONS: &[&str] = &["amount", "amount_eth"];

/// Extract a structured sub-command from the interaction payload, if one is
/// present. Returns `None` for payloads that do not parse or carry no
/// recognizable command; callers fall back to their own values in that case.
pub fn parse_transfer_override(payload: &str) -> Option<TransferOverride> {
    let interaction: Interaction = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(err) => {
            debug!("interaction payload is not a command envelope error={}", err);
            return None;
        }
    };
    let data = interaction.data?;

    let options = if SEND_COMMANDS.contains(&data.name.as_str()) {
        // Top-level command is already the transfer command.
        &data.options[..]
    } else {
        // Otherwise look one level down for a transfer sub-command.
        let sub = data.options.iter().find(|opt| SEND_COMMANDS.contains(&opt.name.as_str()))?;
        &sub.options[..]
    };

    let mut result = TransferOverride::default();
    for option in options {
        if RECEIVER_OPTIONS.contains(&option.name.as_str()) {
            if let Some(serde_json::Value::String(id)) = &option.value {
                if !id.trim().is_empty() {
                    result.receiver_id = Some(UserId::new(id.trim()));
                }
            }
        } else if AMOUNT_OPTIONS.contains(&option.name.as_str()) {
            result.amount_wei = option.value.as_ref().and_then(parse_amount_value);
        }
    }

    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}

fn parse_amount_value(value: &serde_json::Value) -> Option<U256> {
    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    match parse_ether(&text) {
        Ok(wei) => Some(wei),
        Err(err) => {
            debug!("interaction payload amount ignored value={} error={}", text, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn proof_normalizes_signature_and_serializes_payload() {
        let proof = AuthorizationProof::new(1_700_000_000, "0xAB12", &json!({"type": 2})).expect("proof");
        assert_eq!(proof.signature, "ab12");
        assert_eq!(proof.payload, "{\"type\":2}");

        let string_payload = AuthorizationProof::new(1, "ff00", &json!("raw body")).expect("proof");
        assert_eq!(string_payload.payload, "raw body");
    }

    #[test]
    fn proof_rejects_malformed_signature() {
        assert!(AuthorizationProof::new(1, "", &json!({})).is_err());
        assert!(AuthorizationProof::new(1, "xyz", &json!({})).is_err());
    }

    #[test]
    fn override_extracted_from_nested_subcommand() {
        let payload = json!({
            "data": {
                "name": "wallet",
                "options": [{
                    "name": "send",
                    "options": [
                        {"name": "to", "value": "bob"},
                        {"name": "amount", "value": "0.01"}
                    ]
                }]
            }
        })
        .to_string();

        let parsed = parse_transfer_override(&payload).expect("override");
        assert_eq!(parsed.receiver_id, Some(UserId::new("bob")));
        assert_eq!(parsed.amount_wei, Some(parse_ether("0.01").expect("wei")));
    }

    #[test]
    fn override_extracted_from_top_level_command() {
        let payload = json!({
            "data": {
                "name": "tip",
                "options": [{"name": "user", "value": "carol"}]
            }
        })
        .to_string();

        let parsed = parse_transfer_override(&payload).expect("override");
        assert_eq!(parsed.receiver_id, Some(UserId::new("carol")));
        assert_eq!(parsed.amount_wei, None);
    }

    #[test]
    fn malformed_payloads_yield_no_override() {
        assert_eq!(parse_transfer_override("not json"), None);
        assert_eq!(parse_transfer_override("{}"), None);
        assert_eq!(parse_transfer_override(&json!({"data": {"name": "ping"}}).to_string()), None);
        // Recognized command with unusable values degrades to no override.
        let payload = json!({
            "data": {"name": "send", "options": [{"name": "amount", "value": "lots"}]}
        })
        .to_string();
        assert_eq!(parse_transfer_override(&payload), None);
    }
}
