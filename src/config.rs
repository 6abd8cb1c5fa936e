use crate::models::TimeOfDay;
use crate::storage::Storage;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Serialize, Deserialize, Debug)]
pub struct Config {
    /// Times pre-filled in the editor and used by `add` when no time is
    /// given.
    pub default_start_time: TimeOfDay,
    pub default_end_time: TimeOfDay,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_start_time: TimeOfDay::new(9, 0).expect("valid time"),
            default_end_time: TimeOfDay::new(10, 0).expect("valid time"),
        }
    }
}

pub fn load_config() -> Result<Config> {
    let mut path = Storage::get_base_dir()?;
    path.push("config.json");

    if !path.exists() {
        let config = Config::default();
        let data = serde_json::to_string_pretty(&config)?;
        fs::write(&path, data)?;
        return Ok(config);
    }

    let data = fs::read_to_string(&path)?;
    let config = serde_json::from_str(&data)?;
    Ok(config)
}
