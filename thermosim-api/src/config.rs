use std::net::SocketAddr;

use thermosim::{Configurable, GlobalConfig};

#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Network address to listen on.
    pub listen: SocketAddr,
    /// Global configuration.
    pub global: GlobalConfig,
}

impl Configurable for ApiConfig {
    fn global(&self) -> &GlobalConfig {
        &self.global
    }
}
