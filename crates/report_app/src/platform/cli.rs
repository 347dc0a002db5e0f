use std::path::PathBuf;

use clap::Parser;

use super::logging::LogDestination;

/// Terminal controller for server-side data export jobs.
#[derive(Debug, Parser)]
#[command(name = "report-client", version)]
pub struct Args {
    /// RON configuration file; defaults are used when it does not exist.
    #[arg(long, default_value = "report_client.ron")]
    pub config: PathBuf,

    /// Overrides `base_url` from the configuration file.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    /// Write a configuration file with default values to `--config` and exit.
    #[arg(long)]
    pub write_default_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["report-client"]);
        assert_eq!(args.config, PathBuf::from("report_client.ron"));
        assert_eq!(args.log, LogDestination::File);
        assert!(args.base_url.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn overrides() {
        let args = Args::parse_from([
            "report-client",
            "--config",
            "other.ron",
            "--base-url",
            "http://lms.local/xblock/1",
            "--log",
            "both",
            "-v",
        ]);
        assert_eq!(args.config, PathBuf::from("other.ron"));
        assert_eq!(args.base_url.as_deref(), Some("http://lms.local/xblock/1"));
        assert_eq!(args.log, LogDestination::Both);
        assert!(args.verbose);
    }
}
