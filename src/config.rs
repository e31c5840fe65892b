//! Command-line and environment configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// A terminal start page: link shortcuts and a curated news table, synced
/// to a self-hosted JSON endpoint.
#[derive(Parser, Debug)]
#[command(name = "startpage", version)]
pub struct Cli {
    /// Directory for the local backup, the remembered URL and the log file
    /// [default: platform data dir + /startpage]
    #[arg(long, env = "STARTPAGE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Remote store URL.  Replaces the remembered one; pass "" for local-only
    #[arg(long, env = "STARTPAGE_URL")]
    pub url: Option<String>,
}

impl Cli {
    pub fn data_dir(&self) -> Result<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("startpage")))
            .context("cannot determine a data directory; pass --data-dir")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_data_dir_wins() {
        let cli = Cli::try_parse_from(["startpage", "--data-dir", "/tmp/sp"]).unwrap();
        assert_eq!(cli.data_dir().unwrap(), PathBuf::from("/tmp/sp"));
        assert!(cli.url.is_none());
    }

    #[test]
    fn empty_url_is_accepted() {
        let cli = Cli::try_parse_from(["startpage", "--url", ""]).unwrap();
        assert_eq!(cli.url.as_deref(), Some(""));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["startpage", "--bogus"]).is_err());
    }
}
