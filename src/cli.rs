use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use ssvep_vsync::SyncProtocol;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long, default_value = "ssvep.toml")]
    pub config: PathBuf,

    /// Sync patch protocol (overrides config): binary or pulse-interval
    #[arg(long)]
    pub protocol: Option<SyncProtocol>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the full-screen SSVEP session (default)
    Session,
    /// Render a stimulus offline to numbered PNG frames
    Record(RecordArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RecordArgs {
    /// Output directory for frame_NNNNN.png files
    #[arg(long, default_value = "frames")]
    pub out: PathBuf,

    #[arg(long, default_value_t = 60.0)]
    pub frame_rate: f64,

    /// Seconds of stimulus to record
    #[arg(long, default_value_t = 5.0)]
    pub duration: f64,

    #[arg(long, default_value_t = 1920)]
    pub width: u32,

    #[arg(long, default_value_t = 1080)]
    pub height: u32,

    #[arg(long, value_enum, default_value_t = RecordStimulus::Reversal)]
    pub stimulus: RecordStimulus,

    /// Board width in world units (defaults depend on the layout)
    #[arg(long)]
    pub board_width: Option<f32>,

    /// Trigger code sent at the start of the recording
    #[arg(long, default_value_t = 0)]
    pub code: i64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStimulus {
    /// One centred pattern-reversal board
    Reversal,
    /// Left and right boards at the first two flash rates
    Dual,
    /// Left, right and centre boards at the first three flash rates
    Triple,
    /// One centred sine contrast-modulated board
    Contrast,
    /// Sine boards left and right with a square-wave centre board
    ContrastTriple,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_contrast_triple_layout() {
        let args = Args::try_parse_from(["ssvep-present", "record", "--stimulus", "contrast-triple"])
            .unwrap();
        match args.command {
            Some(Command::Record(r)) => assert_eq!(r.stimulus, RecordStimulus::ContrastTriple),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn defaults_to_session() {
        let args = Args::try_parse_from(["ssvep-present"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.config, PathBuf::from("ssvep.toml"));
        assert!(args.protocol.is_none());
    }

    #[test]
    fn parses_record_options() {
        let args = Args::try_parse_from([
            "ssvep-present",
            "--protocol",
            "v2",
            "record",
            "--out",
            "/tmp/frames",
            "--stimulus",
            "dual",
            "--frame-rate",
            "120",
        ])
        .unwrap();
        assert_eq!(args.protocol, Some(SyncProtocol::PulseInterval));
        let Some(Command::Record(record)) = args.command else {
            panic!("expected record subcommand");
        };
        assert_eq!(record.stimulus, RecordStimulus::Dual);
        assert_eq!(record.frame_rate, 120.0);
        assert_eq!(record.duration, 5.0);
        assert_eq!(record.out, PathBuf::from("/tmp/frames"));
    }

    #[test]
    fn rejects_unknown_protocol() {
        assert!(Args::try_parse_from(["ssvep-present", "--protocol", "morse"]).is_err());
    }
}
