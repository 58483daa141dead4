use super::{load_json, LinkConfig};
use crate::aggregate::AggregateParams;
use crate::dispatch::DispatchParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json_out: Option<PathBuf>,
    pub overlay_png: Option<PathBuf>,
    pub binary_png: Option<PathBuf>,
    /// Print the text overlay to stdout.
    pub print_overlay: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    pub input: PathBuf,
    /// Gray values strictly above this become set pixels.
    #[serde(default)]
    pub threshold: u8,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub dispatch: DispatchParams,
    #[serde(default)]
    pub aggregate: AggregateParams,
    #[serde(default)]
    pub output: OutputConfig,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let config: RuntimeConfig = load_json(path)?;
    config
        .dispatch
        .geometry
        .validate()
        .map_err(|e| format!("Invalid geometry in {}: {e}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::TileGeometry;
    use crate::protocol::DecodePolicy;
    use crate::transport::ReplyWait;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg: RuntimeConfig =
            serde_json::from_str(r#"{ "input": "cross.png" }"#).expect("valid json");
        assert_eq!(cfg.threshold, 0);
        assert!(matches!(cfg.link, LinkConfig::Simulated(_)));
        assert_eq!(cfg.dispatch.geometry, TileGeometry::default());
        assert_eq!(cfg.dispatch.reply_wait, ReplyWait::UntilComplete);
        assert_eq!(cfg.aggregate.theta_delta_deg, 15);
        assert!(cfg.output.json_out.is_none());
    }

    #[test]
    fn nested_sections_override_fields() {
        let cfg: RuntimeConfig = serde_json::from_str(
            r#"{
                "input": "in.png",
                "link": { "kind": "device", "path": "/dev/ttyUSB0" },
                "dispatch": {
                    "decode_policy": "strict",
                    "reply_wait": "fixed_window",
                    "timing": { "reply_window_ms": 1000 }
                },
                "output": { "print_overlay": true }
            }"#,
        )
        .expect("valid json");
        assert!(matches!(cfg.link, LinkConfig::Device { .. }));
        assert_eq!(cfg.dispatch.decode_policy, DecodePolicy::Strict);
        assert_eq!(cfg.dispatch.reply_wait, ReplyWait::FixedWindow);
        assert_eq!(cfg.dispatch.timing.reply_window_ms, 1000);
        assert_eq!(cfg.dispatch.timing.header_settle_ms, 10);
        assert!(cfg.output.print_overlay);
    }
}
