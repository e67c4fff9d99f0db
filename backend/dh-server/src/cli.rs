use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "dh-server", version, about = "Dashboard backend with deployment restarts")]
pub struct Cli {
    /// Configuration directory (overrides DH_CONFIG_DIR)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Load and validate configuration and tabs, print the summary, then exit.
    #[arg(long)]
    pub check_config: bool,
}
