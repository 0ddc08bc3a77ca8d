//! Encoder settings.
//!
//! Settings are plain serde data so they can come from a JSON document, from
//! the environment, or be built in code.

use core::str::FromStr;

use plume_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

use crate::buffer::MIN_CAPACITY;

pub const ENV_BUFFER_SIZE: &str = "PLUME_JSON_BUFFER_SIZE";
pub const ENV_LINE_BREAK: &str = "PLUME_JSON_LINE_BREAK";
pub const ENV_CONTROL_CHARS: &str = "PLUME_JSON_CONTROL_CHARS";
pub const ENV_FLOAT_PRECISION: &str = "PLUME_JSON_FLOAT_PRECISION";

/// Line terminator appended to every flushed record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineBreak {
    /// `\r\n` on Windows, `\n` elsewhere.
    #[default]
    Platform,
    Lf,
    CrLf,
}

impl LineBreak {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Platform if cfg!(windows) => b"\r\n",
            Self::Platform | Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }
}

impl FromStr for LineBreak {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "platform" => Ok(Self::Platform),
            "lf" => Ok(Self::Lf),
            "crlf" => Ok(Self::CrLf),
            other => Err(CoreError::invalid_config(format!("unknown line break '{other}'"))),
        }
    }
}

/// What to do with control characters that have no short escape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCharPolicy {
    /// Emit `\u00XX`, keeping output strict JSON.
    #[default]
    Escape,
    /// Leave them out. Compact but lossy.
    Drop,
}

impl FromStr for ControlCharPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "escape" => Ok(Self::Escape),
            "drop" => Ok(Self::Drop),
            other => Err(CoreError::invalid_config(format!(
                "unknown control char policy '{other}'"
            ))),
        }
    }
}

/// How floating point values are rendered.
///
/// Neither form uses exponent notation, and both always carry a fractional
/// part so the value reads back as a float.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatFormat {
    /// Fewest digits that parse back to the same value.
    ///
    /// At most 17 significant digits, but positional notation pads them with
    /// zeros: up to 309 integral digits (`f64::MAX`) or 324 fractional digits
    /// (`5e-324`). One value never takes more than
    /// [`FloatFormat::SHORTEST_MAX_LEN`] bytes.
    #[default]
    Shortest,
    /// Exactly this many fractional digits, rounded half to even on the binary value.
    Fixed(u8),
}

impl FloatFormat {
    pub const MIN_PRECISION: u8 = 1;
    pub const MAX_PRECISION: u8 = 17;

    /// Longest [`FloatFormat::Shortest`] rendering: `-0.` plus 324 digits.
    pub const SHORTEST_MAX_LEN: usize = 327;
}

impl FromStr for FloatFormat {
    type Err = CoreError;

    /// `shortest`, or a digit count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("shortest") {
            return Ok(Self::Shortest);
        }
        s.parse::<u8>()
            .map(Self::Fixed)
            .map_err(|e| CoreError::invalid_config(format!("float precision '{s}': {e}")))
    }
}

/// Encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Starting buffer size in bytes. The buffer doubles on demand.
    pub initial_capacity: usize,
    pub line_break: LineBreak,
    pub control_chars: ControlCharPolicy,
    pub float_format: FloatFormat,
}

impl EncoderConfig {
    pub const DEFAULT_CAPACITY: usize = 32 * 1024;

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CoreError::invalid_config(format!("encoder config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read overrides from `PLUME_JSON_*` environment variables.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EncoderConfig::from_env`] with a caller-provided variable source.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_BUFFER_SIZE) {
            config.initial_capacity = raw.trim().parse().map_err(|e| {
                CoreError::invalid_config(format!("{ENV_BUFFER_SIZE}='{raw}': {e}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_LINE_BREAK) {
            config.line_break = raw.trim().parse()?;
        }
        if let Some(raw) = lookup(ENV_CONTROL_CHARS) {
            config.control_chars = raw.trim().parse()?;
        }
        if let Some(raw) = lookup(ENV_FLOAT_PRECISION) {
            config.float_format = raw.trim().parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.initial_capacity < MIN_CAPACITY {
            return Err(CoreError::invalid_config(format!(
                "initial_capacity must be at least {MIN_CAPACITY}, got {}",
                self.initial_capacity
            )));
        }

        if let FloatFormat::Fixed(precision) = self.float_format {
            if !(FloatFormat::MIN_PRECISION..=FloatFormat::MAX_PRECISION).contains(&precision) {
                return Err(CoreError::invalid_config(format!(
                    "float precision must be within {}..={}, got {precision}",
                    FloatFormat::MIN_PRECISION,
                    FloatFormat::MAX_PRECISION
                )));
            }
        }

        Ok(())
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_CAPACITY,
            line_break: LineBreak::default(),
            control_chars: ControlCharPolicy::default(),
            float_format: FloatFormat::default(),
        }
    }
}
