//! Command-line parsing and the resolved run configuration.

use clap::{CommandFactory, Parser};
use framebench_core::{defaults, FramebenchError, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// Which frame operation the benchmark drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Copy,
    Remap,
    Blend,
}

impl OpKind {
    /// Case-insensitive parse; anything unrecognized is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "copy" => Some(Self::Copy),
            "remap" => Some(Self::Remap),
            "blend" => Some(Self::Blend),
            _ => None,
        }
    }

    /// Number of input streams the operation consumes.
    pub fn input_count(self) -> usize {
        match self {
            Self::Blend => 2,
            Self::Copy | Self::Remap => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Remap => "remap",
            Self::Blend => "blend",
        }
    }
}

/// Raw command line. Resolution into a [`RunConfig`] happens in a
/// second step so "unknown type" and count mismatches surface as
/// our own configuration errors rather than clap usage errors.
#[derive(Parser, Debug)]
#[command(
    name = "framebench",
    about = "Benchmark GPU copy/remap/blend operations over raw NV12 frames"
)]
pub struct Cli {
    /// Operation to benchmark: copy, remap, or blend
    #[arg(long = "type", value_name = "TYPE")]
    pub op_type: Option<String>,

    /// First input stream (raw NV12 frames)
    #[arg(long)]
    pub input0: Option<PathBuf>,

    /// Second input stream, blend only
    #[arg(long)]
    pub input1: Option<PathBuf>,

    /// Output stream path
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Input frame width
    #[arg(long = "in-w", default_value_t = defaults::FRAME_WIDTH)]
    pub in_width: u32,

    /// Input frame height
    #[arg(long = "in-h", default_value_t = defaults::FRAME_HEIGHT)]
    pub in_height: u32,

    /// Output frame width
    #[arg(long = "out-w", default_value_t = defaults::FRAME_WIDTH)]
    pub out_width: u32,

    /// Output frame height
    #[arg(long = "out-h", default_value_t = defaults::FRAME_HEIGHT)]
    pub out_height: u32,

    /// Write each iteration's output frame to disk
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    pub save: bool,

    /// Benchmark iteration count
    #[arg(long = "loop", default_value_t = 1, value_name = "COUNT")]
    pub loop_count: u32,
}

/// Fully resolved run configuration, immutable once validated.
///
/// `op` stays `None` when `--type` was missing or unrecognized; the
/// harness rejects it when it tries to build the operation, before
/// any device resource exists.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub op: Option<OpKind>,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub in_width: u32,
    pub in_height: u32,
    pub out_width: u32,
    pub out_height: u32,
    pub save: bool,
    pub loop_count: u32,
}

impl RunConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        // An explicit unrecognized type is a configuration error at
        // parse time; only a missing --type survives to dispatch.
        let op = match cli.op_type.as_deref() {
            None => None,
            Some(s) => match OpKind::parse(s) {
                Some(op) => Some(op),
                None => {
                    return Err(FramebenchError::Config(format!(
                        "unknown operation type {:?}, expected copy, remap, or blend\n{}",
                        s,
                        Cli::command().render_usage()
                    )))
                }
            },
        };

        let mut inputs = Vec::new();
        if let Some(p) = cli.input0 {
            inputs.push(p);
        }
        if let Some(p) = cli.input1 {
            inputs.push(p);
        }
        // A surplus input for a single-input operation is ignored, not
        // rejected; too few inputs is still an error in validate.
        if let Some(op) = op {
            if inputs.len() > op.input_count() {
                warn!(
                    "{} uses {} input stream(s), ignoring {} extra",
                    op.name(),
                    op.input_count(),
                    inputs.len() - op.input_count()
                );
                inputs.truncate(op.input_count());
            }
        }

        let output = cli.output.ok_or_else(|| {
            FramebenchError::Config("an output file is required (--output)".to_string())
        })?;

        let config = Self {
            op,
            inputs,
            output,
            in_width: cli.in_width,
            in_height: cli.in_height,
            out_width: cli.out_width,
            out_height: cli.out_height,
            save: cli.save,
            loop_count: cli.loop_count,
        };
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that must pass before any resource is
    /// acquired. Stream-count mismatches are caught here, ahead of
    /// pool creation.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(FramebenchError::Config(
                "at least one input file is required (--input0)".to_string(),
            ));
        }
        if let Some(op) = self.op {
            let needed = op.input_count();
            if self.inputs.len() != needed {
                let msg = match op {
                    OpKind::Blend => "blend needs 2 input files".to_string(),
                    _ => format!(
                        "{} needs exactly {} input file, got {}",
                        op.name(),
                        needed,
                        self.inputs.len()
                    ),
                };
                return Err(FramebenchError::Config(msg));
            }
        }
        if self.loop_count < 1 {
            return Err(FramebenchError::Config(
                "loop count must be at least 1".to_string(),
            ));
        }
        if self.in_width == 0 || self.in_height == 0 || self.out_width == 0 || self.out_height == 0
        {
            return Err(FramebenchError::Config(
                "frame dimensions must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Echo every resolved option before the run starts.
    pub fn log_summary(&self) {
        info!(
            op = self.op.map(OpKind::name).unwrap_or("<unset>"),
            "operation type"
        );
        for (i, path) in self.inputs.iter().enumerate() {
            info!(index = i, path = %path.display(), "input stream");
        }
        info!(path = %self.output.display(), "output stream");
        info!(
            in_size = format!("{}x{}", self.in_width, self.in_height),
            out_size = format!("{}x{}", self.out_width, self.out_height),
            "resolution"
        );
        info!(save = self.save, loop_count = self.loop_count, "run options");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            op_type: Some("copy".to_string()),
            input0: Some(PathBuf::from("a.nv12")),
            input1: None,
            output: Some(PathBuf::from("out.nv12")),
            in_width: defaults::FRAME_WIDTH,
            in_height: defaults::FRAME_HEIGHT,
            out_width: defaults::FRAME_WIDTH,
            out_height: defaults::FRAME_HEIGHT,
            save: true,
            loop_count: 1,
        }
    }

    #[test]
    fn op_kind_parse_is_case_insensitive() {
        assert_eq!(OpKind::parse("copy"), Some(OpKind::Copy));
        assert_eq!(OpKind::parse("REMAP"), Some(OpKind::Remap));
        assert_eq!(OpKind::parse("Blend"), Some(OpKind::Blend));
        assert_eq!(OpKind::parse("warp"), None);
        assert_eq!(OpKind::parse(""), None);
    }

    #[test]
    fn defaults_match_contract() {
        let config = RunConfig::from_cli(base_cli()).unwrap();
        assert_eq!(config.in_width, 1280);
        assert_eq!(config.in_height, 800);
        assert!(config.save);
        assert_eq!(config.loop_count, 1);
    }

    #[test]
    fn unknown_type_is_rejected_with_usage() {
        let mut cli = base_cli();
        cli.op_type = Some("warp".to_string());
        let err = RunConfig::from_cli(cli).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown operation type"));
        assert!(msg.contains("Usage"));
    }

    #[test]
    fn missing_type_survives_as_none() {
        let mut cli = base_cli();
        cli.op_type = None;
        let config = RunConfig::from_cli(cli).unwrap();
        assert_eq!(config.op, None);
    }

    #[test]
    fn blend_with_one_input_is_rejected() {
        let mut cli = base_cli();
        cli.op_type = Some("blend".to_string());
        let err = RunConfig::from_cli(cli).unwrap_err();
        assert!(err.to_string().contains("blend needs 2 input files"));
    }

    #[test]
    fn copy_with_two_inputs_ignores_the_extra() {
        let mut cli = base_cli();
        cli.input1 = Some(PathBuf::from("b.nv12"));
        let config = RunConfig::from_cli(cli).unwrap();
        assert_eq!(config.inputs, vec![PathBuf::from("a.nv12")]);
    }

    #[test]
    fn missing_output_is_rejected() {
        let mut cli = base_cli();
        cli.output = None;
        assert!(RunConfig::from_cli(cli).is_err());
    }

    #[test]
    fn missing_input_is_rejected() {
        let mut cli = base_cli();
        cli.input0 = None;
        assert!(RunConfig::from_cli(cli).is_err());
    }

    #[test]
    fn zero_loop_count_is_rejected() {
        let mut cli = base_cli();
        cli.loop_count = 0;
        assert!(RunConfig::from_cli(cli).is_err());
    }
}
