use serde::Deserialize;

use dqpsk_modem::IqFormat;

/// How bits are stored in an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum InputFormat {
    /// Text of '0'/'1' characters, whitespace and '_' ignored
    #[default]
    Bitstr,
    /// Packed bytes, MSB of the first byte is the first bit
    Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct CfgInput {
    pub format: InputFormat,
    /// Read bits from this file instead of the command line
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CfgOutput {
    pub format: IqFormat,
    /// Write symbols to this file instead of stdout
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    /// Verbose log file, if any
    pub debug_log: Option<String>,
    pub input: CfgInput,
    pub output: CfgOutput,
}
