use std::io::{self, Write};

use serde::Deserialize;

use crate::dsp_types::*;

/// Serialization of a symbol sequence for the next stage in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum IqFormat {
    /// One "re im" pair per line, 8 decimals
    #[default]
    Text,
    /// Interleaved little-endian f32, as read by most SDR tools
    Cf32,
    /// Interleaved little-endian f64
    Cf64,
}

impl IqFormat {
    /// Parse a format name as given on the command line, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "text" | "txt" => Some(IqFormat::Text),
            "cf32" | "complex64" => Some(IqFormat::Cf32),
            "cf64" | "complex128" => Some(IqFormat::Cf64),
            _ => None,
        }
    }
}

/// Write all symbols to `w` in the given format.
pub fn write_symbols<W: Write>(w: &mut W, symbols: &[ComplexSample], format: IqFormat) -> io::Result<()> {
    match format {
        IqFormat::Text => {
            for s in symbols {
                writeln!(w, "{:.8} {:.8}", s.re, s.im)?;
            }
        }
        IqFormat::Cf32 => {
            for s in symbols {
                w.write_all(&(s.re as f32).to_le_bytes())?;
                w.write_all(&(s.im as f32).to_le_bytes())?;
            }
        }
        IqFormat::Cf64 => {
            for s in symbols {
                w.write_all(&s.re.to_le_bytes())?;
                w.write_all(&s.im.to_le_bytes())?;
            }
        }
    }
    tracing::debug!("wrote {} symbols as {:?}", symbols.len(), format);
    w.flush()
}
