use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub server: duet_shared::config::Server,
}
impl Config {
    pub const FILENAME: &str = "config.toml";

    pub fn load(filename: &str) -> anyhow::Result<Self> {
        Ok(duet_shared::config::load_config(filename)?)
    }
}
