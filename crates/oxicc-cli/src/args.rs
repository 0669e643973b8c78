use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "oxicc", about = "Inspect ICC profiles and assign them to devices")]
pub struct Cli {
    /// More log output, repeat for debug messages
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file holding device assignments and rank maps
    #[arg(long, value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    /// Extra profile directory, searched first
    #[arg(long = "profile-dir", value_name = "DIR", global = true)]
    pub profile_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show header, tag table and ID status of a profile
    Info {
        /// Profile name or path
        profile: PathBuf,
    },
    /// Rank all known profiles for a device
    List {
        #[command(flatten)]
        device: DeviceArgs,
    },
    /// Assign a profile to a device
    Assign {
        #[command(flatten)]
        device: DeviceArgs,
        /// Profile name or path
        profile: String,
    },
    /// Remove the profile assignment of a device
    Unassign {
        #[command(flatten)]
        device: DeviceArgs,
    },
    /// Assign a profile, "automatic" picks the best ranked one
    Setup {
        #[command(flatten)]
        device: DeviceArgs,
        /// Profile name; without it the current assignment or the best
        /// ranked profile is used
        profile: Option<String>,
    },
    /// Print profile or device data
    Dump {
        #[arg(value_enum)]
        kind: DumpKind,
        #[command(flatten)]
        device: DeviceArgs,
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Recompute and store the MD5 profile ID
    FixId {
        /// Profile name or path
        profile: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// OpenICC device JSON file
    #[arg(long, value_name = "FILE")]
    pub device: PathBuf,

    /// Device class inside the JSON, the first one by default
    #[arg(long, value_name = "CLASS")]
    pub class: Option<String>,

    /// Position of the device in its class
    #[arg(long, default_value_t = 0)]
    pub pos: usize,

    /// OpenICC rank map JSON, else the stored rank map
    #[arg(long, value_name = "FILE")]
    pub rank_map: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    /// Assigned profile bytes
    Icc,
    /// Device JSON
    Openicc,
    /// Rank map JSON
    OpeniccRankMap,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dump() {
        let cli = Cli::parse_from([
            "oxicc",
            "-vv",
            "dump",
            "openicc-rank-map",
            "--device",
            "dev.json",
            "--pos",
            "2",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Dump { kind, device, output } => {
                assert_eq!(kind, DumpKind::OpeniccRankMap);
                assert_eq!(device.pos, 2);
                assert!(output.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
