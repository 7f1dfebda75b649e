//! Editor configuration.
//!
//! Deserialized from the host page as camelCase JSON; every field is
//! optional and falls back to the defaults below.

use fsm_core::{DEFAULT_NODE_LABEL, DEFAULT_TEXT_CONTENT, GraphError};
use fsm_render::{EDGE_HIT_THRESHOLD, EdgeHitMode, HitOptions, Palette};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Pick radius for transitions, in pixels.
    pub edge_hit_threshold: f64,
    pub edge_hit_mode: EdgeHitMode,
    /// Give new states and transitions a default description note.
    pub auto_annotate: bool,
    /// Label of newly placed states.
    pub node_label: String,
    /// Content of newly placed texts.
    pub text_content: String,
    pub palette: Palette,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            edge_hit_threshold: EDGE_HIT_THRESHOLD,
            edge_hit_mode: EdgeHitMode::default(),
            auto_annotate: true,
            node_label: DEFAULT_NODE_LABEL.to_string(),
            text_content: DEFAULT_TEXT_CONTENT.to_string(),
            palette: Palette::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let config: EditorConfig =
            serde_json::from_str(json).map_err(|e| GraphError::InvalidFormat(e.to_string()))?;
        if !(config.edge_hit_threshold.is_finite() && config.edge_hit_threshold > 0.0) {
            return Err(GraphError::InvalidFormat(format!(
                "edgeHitThreshold must be positive, got {}",
                config.edge_hit_threshold
            )));
        }
        Ok(config)
    }

    pub fn hit_options(&self) -> HitOptions {
        HitOptions {
            edge_threshold: self.edge_hit_threshold,
            edge_mode: self.edge_hit_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn partial_overrides() {
        let c = EditorConfig::from_json(
            r#"{"edgeHitMode": "segment", "autoAnnotate": false, "nodeLabel": "S"}"#,
        )
        .unwrap();
        assert_eq!(c.edge_hit_mode, EdgeHitMode::Segment);
        assert!(!c.auto_annotate);
        assert_eq!(c.node_label, "S");
        assert_eq!(c.edge_hit_threshold, 20.0);
    }

    #[test]
    fn rejects_bad_threshold() {
        assert!(EditorConfig::from_json(r#"{"edgeHitThreshold": 0}"#).is_err());
        assert!(EditorConfig::from_json(r#"{"edgeHitMode": "nearest"}"#).is_err());
    }
}
