//! Configuration for the parameter bridge.
//!
//! Controls how query strings are split and which text unit the character
//! queries expose.

use serde::{Deserialize, Serialize};

use crate::error::ParamsResult;

/// Unit a character query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeUnit {
    /// UTF-16 code units, the browser's native string representation.
    /// Characters outside the BMP take two positions (a surrogate pair).
    #[default]
    Utf16,
    /// Unicode scalar values, one position per `char`.
    Scalar,
}

impl CodeUnit {
    /// Encode text into a sequence of units.
    pub fn encode(self, text: &str) -> Vec<u32> {
        match self {
            CodeUnit::Utf16 => text.encode_utf16().map(u32::from).collect(),
            CodeUnit::Scalar => text.chars().map(u32::from).collect(),
        }
    }

    /// Decode units back into text. Unpaired surrogates and invalid scalars
    /// become U+FFFD.
    pub fn decode(self, units: &[u32]) -> String {
        match self {
            CodeUnit::Utf16 => {
                let units: Vec<u16> = units
                    .iter()
                    .map(|&u| u16::try_from(u).unwrap_or(0xFFFD))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            CodeUnit::Scalar => units
                .iter()
                .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect(),
        }
    }
}

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Unit exposed by `key_char` / `value_char`.
    /// Default: UTF-16
    pub code_unit: CodeUnit,

    /// Value the FFI edge returns for an out-of-range index.
    /// Must not be a valid unit, so it is negative.
    /// Default: -1
    pub out_of_range_sentinel: i32,

    /// Treat `;` as a pair separator in addition to `&`.
    /// Default: false (URLSearchParams behavior)
    pub semicolon_separator: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            code_unit: CodeUnit::Utf16,
            out_of_range_sentinel: -1,
            semicolon_separator: false,
        }
    }
}

impl BridgeConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ParamsResult<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        if config.out_of_range_sentinel >= 0 {
            config.out_of_range_sentinel = -1;
        }
        Ok(config)
    }

    /// Set the exposed code unit.
    pub fn code_unit(mut self, unit: CodeUnit) -> Self {
        self.code_unit = unit;
        self
    }

    /// Set the out-of-range sentinel. Non-negative values are ignored.
    pub fn out_of_range_sentinel(mut self, sentinel: i32) -> Self {
        if sentinel < 0 {
            self.out_of_range_sentinel = sentinel;
        }
        self
    }

    /// Enable or disable `;` as a pair separator.
    pub fn semicolon_separator(mut self, enabled: bool) -> Self {
        self.semicolon_separator = enabled;
        self
    }
}
