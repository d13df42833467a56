//! Rendering of collected results.
//!
//! Renderers are projections of [`HostResult`] values and hold no state of
//! their own.
//!
//! # Submodules
//!
//! - `text` - human readable listing
//! - `json` - JSON array for scripting

use clap::ValueEnum;
use std::io::Write;
use strum_macros::{Display, EnumString};

use crate::{CertInfoError, HostResult};

pub mod json;
pub mod text;

/// How results are written to standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, ValueEnum)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputMode {
    Json,
    #[default]
    Text,
    /// Render nothing; certificates are still checked for expiration
    None,
}

/// Writes `results` to `out` in the given mode.
pub fn render<W: Write>(
    mode: OutputMode,
    results: &[HostResult],
    out: &mut W,
) -> Result<(), CertInfoError> {
    match mode {
        OutputMode::Json => json::render(results, out),
        OutputMode::Text => text::render(results, out),
        OutputMode::None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_from_str() {
        assert_eq!("json".parse::<OutputMode>().unwrap(), OutputMode::Json);
        assert_eq!("TEXT".parse::<OutputMode>().unwrap(), OutputMode::Text);
        assert_eq!("none".parse::<OutputMode>().unwrap(), OutputMode::None);
        assert!("summary".parse::<OutputMode>().is_err());
    }

    #[test]
    fn test_output_mode_value_enum() {
        assert_eq!(
            <OutputMode as ValueEnum>::from_str("json", false).unwrap(),
            OutputMode::Json
        );
        assert!(<OutputMode as ValueEnum>::from_str("summary", false).is_err());
    }

    #[test]
    fn test_output_mode_display() {
        assert_eq!(OutputMode::Json.to_string(), "json");
        assert_eq!(OutputMode::None.to_string(), "none");
    }

    #[test]
    fn test_none_writes_nothing() {
        let results = vec![HostResult {
            host: "example.com".to_string(),
            port: 443,
            certs: Vec::new(),
        }];
        let mut out = Vec::new();
        render(OutputMode::None, &results, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
