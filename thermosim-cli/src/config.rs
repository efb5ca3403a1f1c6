use std::path::PathBuf;

use thermosim::GlobalConfig;

#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Sensor configuration file.
    pub config_path: PathBuf,
    /// Output file, `-` for standard output.
    pub output: PathBuf,
    /// Write every tick as soon as it is generated.
    pub stream: bool,
    /// Global configuration.
    pub global: GlobalConfig,
}

impl CliConfig {
    /// Whether readings go to standard output.
    pub fn is_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}
