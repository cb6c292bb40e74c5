use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Frame notes for review sessions: add, report, export
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Session file (JSON)
    #[arg(short = 's', long = "session", value_name = "SESSION")]
    pub session: PathBuf,

    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging to file (default: playa-notes.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append a source to the session timeline (creates the session if missing)
    Source {
        /// Media path, sequence notation allowed (shot.####.exr, shot.%04d.exr)
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Node name (default: source<N>)
        #[arg(long = "node")]
        node: Option<String>,

        /// Display name (default: file name)
        #[arg(long = "name")]
        name: Option<String>,

        /// First native frame
        #[arg(long = "start", default_value = "1")]
        start: i32,

        /// Frame count
        #[arg(long = "length", value_name = "N")]
        length: i32,

        /// Image size
        #[arg(long = "size", value_names = ["W", "H"], num_args = 2)]
        size: Option<Vec<u32>>,
    },

    /// Add a note to a timeline frame
    Add {
        /// Note text
        #[arg(value_name = "TEXT")]
        text: String,

        /// Global frame (default: session current frame)
        #[arg(short = 'f', long = "frame", value_name = "N")]
        frame: Option<i32>,
    },

    /// Print the report of the clip at a frame and copy it to the clipboard
    Report {
        #[arg(short = 'f', long = "frame", value_name = "N")]
        frame: Option<i32>,

        /// Mirror the clipboard to this file
        #[arg(long = "clipboard", value_name = "FILE")]
        clipboard: Option<PathBuf>,
    },

    /// Export report, session snapshot and annotated frames of the clip at a frame
    Export {
        #[arg(short = 'f', long = "frame", value_name = "N")]
        frame: Option<i32>,

        /// Export root (default: settings, then the source folder)
        #[arg(short = 'o', long = "out", value_name = "DIR")]
        out: Option<PathBuf>,

        /// Mirror the clipboard to this file
        #[arg(long = "clipboard", value_name = "FILE")]
        clipboard: Option<PathBuf>,
    },

    /// List annotated frames of the clip at a frame (read only)
    Frames {
        #[arg(short = 'f', long = "frame", value_name = "N")]
        frame: Option<i32>,
    },

    /// Remove blank notes and mark annotated frames of the clip at a frame
    Clean {
        #[arg(short = 'f', long = "frame", value_name = "N")]
        frame: Option<i32>,
    },
}

impl Command {
    /// Commands that change the session file.
    pub fn mutates_session(&self) -> bool {
        !matches!(self, Command::Frames { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from(["playa-notes", "-s", "r.json", "-vv", "add", "fix the edge", "-f", "12"]).unwrap();
        assert_eq!(args.verbosity, 2);
        match args.command {
            Command::Add { text, frame } => {
                assert_eq!(text, "fix the edge");
                assert_eq!(frame, Some(12));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_source_size() {
        let args = Args::try_parse_from([
            "playa-notes", "-s", "r.json", "source", "/a/shot.%04d.exr", "--start", "1001", "--length", "48", "--size", "2048",
            "858",
        ])
        .unwrap();
        match args.command {
            Command::Source { start, length, size, .. } => {
                assert_eq!((start, length), (1001, 48));
                assert_eq!(size, Some(vec![2048, 858]));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Args::try_parse_from(["playa-notes", "add", "x"]).is_err());
    }
}
