//! Wire types for the provider's station status response.
//!
//! The provider is loosely specified, so every field is optional and a few
//! known aliases are accepted. Interpretation lives in `convert`.

use serde::Deserialize;

/// Status response for a single station.
///
/// ```json
/// { "name": "Civic Center", "evses": [ { "label": "1", "state": "CHARGING" } ] }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationStatusResponse {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, alias = "charge_points", alias = "chargePoints", alias = "ports")]
    pub evses: Option<Vec<EvseEntry>>,
}

/// One charge point in a status response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvseEntry {
    #[serde(default, alias = "number", alias = "outlet_number", alias = "outletNumber")]
    pub label: Option<EvseLabel>,

    #[serde(default, alias = "status")]
    pub state: Option<String>,
}

/// Charge-point labels arrive as either strings or integers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EvseLabel {
    Number(i64),
    Text(String),
}

impl EvseLabel {
    /// Normalised text form; `None` for blank strings.
    pub fn to_text(&self) -> Option<String> {
        match self {
            EvseLabel::Number(n) => Some(n.to_string()),
            EvseLabel::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_response() {
        let json = r#"{
            "name": "Civic Center",
            "evses": [
                {"label": "1", "state": "CHARGING"},
                {"number": 2, "status": "PLUGGED_OUT"}
            ]
        }"#;

        let response: StationStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.name.as_deref(), Some("Civic Center"));

        let evses = response.evses.unwrap();
        assert_eq!(evses.len(), 2);
        assert_eq!(evses[0].label, Some(EvseLabel::Text("1".into())));
        assert_eq!(evses[1].label, Some(EvseLabel::Number(2)));
        assert_eq!(evses[1].state.as_deref(), Some("PLUGGED_OUT"));
    }

    #[test]
    fn parse_empty_object() {
        let response: StationStatusResponse = serde_json::from_str("{}").unwrap();
        assert!(response.name.is_none());
        assert!(response.evses.is_none());
    }

    #[test]
    fn parse_alias_field_names() {
        let json = r#"{"chargePoints": [{"outletNumber": 3, "state": "IDLE"}]}"#;
        let response: StationStatusResponse = serde_json::from_str(json).unwrap();
        let evses = response.evses.unwrap();
        assert_eq!(evses[0].label, Some(EvseLabel::Number(3)));
    }

    #[test]
    fn label_text_normalisation() {
        assert_eq!(EvseLabel::Number(7).to_text().as_deref(), Some("7"));
        assert_eq!(EvseLabel::Text(" A2 ".into()).to_text().as_deref(), Some("A2"));
        assert_eq!(EvseLabel::Text("   ".into()).to_text(), None);
    }
}
