use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use dqpsk_modem::IqFormat;

use super::tool_config::{CfgInput, CfgOutput, InputFormat, ToolConfig};

pub const EXPECTED_CONFIG_VERSION: &str = "0.1";

/// Build `ToolConfig` from a TOML configuration string
pub fn from_toml_str(toml_str: &str) -> Result<ToolConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    if root.config_version != EXPECTED_CONFIG_VERSION {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, EXPECTED_CONFIG_VERSION
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if let Some(ref input) = root.input {
        if !input.extra.is_empty() {
            return Err(format!("Unrecognized fields in input: {:?}", sorted_keys(&input.extra)).into());
        }
    }
    if let Some(ref output) = root.output {
        if !output.extra.is_empty() {
            return Err(format!("Unrecognized fields in output: {:?}", sorted_keys(&output.extra)).into());
        }
    }

    let mut cfg = ToolConfig {
        debug_log: root.debug_log,
        ..Default::default()
    };
    if let Some(input) = root.input {
        apply_input_patch(&mut cfg.input, input);
    }
    if let Some(output) = root.output {
        apply_output_patch(&mut cfg.output, output);
    }

    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

/// Build `ToolConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<ToolConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `ToolConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ToolConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    from_reader(f)
}

fn apply_input_patch(dst: &mut CfgInput, src: InputDto) {
    if let Some(v) = src.format {
        dst.format = v;
    }
    dst.file = src.file;
}

fn apply_output_patch(dst: &mut CfgOutput, src: OutputDto) {
    if let Some(v) = src.format {
        dst.format = v;
    }
    dst.file = src.file;
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,

    #[serde(default)]
    input: Option<InputDto>,

    #[serde(default)]
    output: Option<OutputDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct InputDto {
    format: Option<InputFormat>,
    file: Option<String>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct OutputDto {
    format: Option<IqFormat>,
    file: Option<String>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
