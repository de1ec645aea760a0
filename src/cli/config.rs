// CLI configuration for iab-wrap and iab-unwrap
use crate::identity::{parse_asset_id, parse_language_tag, EditRate, DEFAULT_LANGUAGE};
use crate::pipeline::FrameOrder;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;

/// Wraps a directory of IA frames into an IAB track file
#[derive(Parser, Debug)]
#[command(name = "iab-wrap")]
#[command(about = "Wraps a directory of IA frames into an IAB track file", long_about = None)]
#[command(version)]
pub struct WrapConfig {
    /// Input directory containing one IA frame per file
    #[arg(long = "in", value_name = "DIR")]
    pub input: PathBuf,

    /// Output track file
    #[arg(long = "out", value_name = "FILE")]
    pub output: PathBuf,

    /// Edit rate as <num>/<den>, or <num> for <num>/1
    #[arg(long, value_name = "RATE", default_value = "24/1")]
    pub fps: EditRate,

    /// Asset UUID (32 hex digits, hyphens allowed); random when absent
    #[arg(long = "assetid", value_name = "UUID", value_parser = parse_asset_id)]
    pub asset_id: Option<Uuid>,

    /// RFC 5646 spoken language tag
    #[arg(long, value_name = "TAG", default_value = DEFAULT_LANGUAGE, value_parser = parse_language_tag)]
    pub lang: String,

    /// Order in which frame files are wrapped
    #[arg(long, value_enum, default_value_t = FrameOrderArg::Natural)]
    pub order: FrameOrderArg,

    /// Only wrap file names matching this glob pattern (e.g. "*.iab")
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Verbose mode (show per-frame progress)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Unwraps the IA frames of an IAB track file
#[derive(Parser, Debug)]
#[command(name = "iab-unwrap")]
#[command(about = "Unwraps the IA frames of an IAB track file", long_about = None)]
#[command(version)]
pub struct UnwrapConfig {
    /// Input track file
    #[arg(long = "in", value_name = "FILE")]
    pub input: PathBuf,

    /// Existing output directory
    #[arg(long = "out", value_name = "DIR")]
    pub output: PathBuf,

    /// Concatenate all frames into this single file instead of <index>.iab files
    #[arg(long, value_name = "NAME")]
    pub single: Option<String>,

    /// Print the track file identity before extracting
    #[arg(long)]
    pub info: bool,

    /// Output format for --info
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Verbose mode (show per-frame progress)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Frame file ordering as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FrameOrderArg {
    /// Digit runs compare as numbers (2.iab before 10.iab)
    #[default]
    Natural,
    /// Byte-wise file name order
    Lexical,
    /// Filesystem enumeration order
    Fs,
}

impl From<FrameOrderArg> for FrameOrder {
    fn from(arg: FrameOrderArg) -> Self {
        match arg {
            FrameOrderArg::Natural => FrameOrder::Natural,
            FrameOrderArg::Lexical => FrameOrder::Lexical,
            FrameOrderArg::Fs => FrameOrder::FileSystem,
        }
    }
}

/// Output format for identity information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_configs_are_consistent() {
        WrapConfig::command().debug_assert();
        UnwrapConfig::command().debug_assert();
    }

    #[test]
    fn test_wrap_defaults() {
        let config = WrapConfig::try_parse_from(["iab-wrap", "--in", "frames", "--out", "t.mxf"])
            .unwrap();
        assert_eq!(config.fps, EditRate::FPS_24);
        assert_eq!(config.lang, "en");
        assert_eq!(config.asset_id, None);
        assert_eq!(config.order, FrameOrderArg::Natural);
        assert!(config.pattern.is_none());
    }

    #[test]
    fn test_wrap_options() {
        let config = WrapConfig::try_parse_from([
            "iab-wrap",
            "--in",
            "frames",
            "--out",
            "t.mxf",
            "--fps",
            "48",
            "--assetid",
            "0123456789abcdef0123456789ABCDEF",
            "--lang",
            "fr-CA",
            "--order",
            "fs",
        ])
        .unwrap();
        assert_eq!(config.fps, EditRate::new(48, 1).unwrap());
        assert_eq!(
            config.asset_id.unwrap().to_string(),
            "01234567-89ab-cdef-0123-456789abcdef"
        );
        assert_eq!(config.lang, "fr-CA");
        assert_eq!(FrameOrder::from(config.order), FrameOrder::FileSystem);
    }

    #[test]
    fn test_wrap_rejects_bad_values() {
        let base = ["iab-wrap", "--in", "frames", "--out", "t.mxf"];
        for extra in [["--fps", "24/0"], ["--assetid", "xyz"], ["--lang", "not a tag"]] {
            let args = base.iter().chain(extra.iter());
            assert!(WrapConfig::try_parse_from(args).is_err(), "{extra:?}");
        }
        assert!(WrapConfig::try_parse_from(["iab-wrap", "--in", "frames"]).is_err());
    }

    #[test]
    fn test_unwrap_options() {
        let config = UnwrapConfig::try_parse_from([
            "iab-unwrap",
            "--in",
            "t.mxf",
            "--out",
            "out",
            "--single",
            "all.iab",
            "--info",
            "--format",
            "key-value",
        ])
        .unwrap();
        assert_eq!(config.single.as_deref(), Some("all.iab"));
        assert!(config.info);
        assert_eq!(config.format, OutputFormat::KeyValue);
    }
}
