use crate::models::EventBook;
use anyhow::Result;
use std::fs;
use std::path::PathBuf;

const EVENTS_FILE: &str = "events.json";

#[derive(Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn get_base_dir() -> Result<PathBuf> {
        let mut path =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        path.push(".pocketcal");
        if !path.exists() {
            fs::create_dir_all(&path)?;
        }
        Ok(path)
    }

    pub fn new() -> Result<Self> {
        let path = Self::get_base_dir()?;
        Ok(Self::from_path(path.join(EVENTS_FILE)))
    }

    pub fn from_path(path: PathBuf) -> Self {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                let _ = fs::create_dir_all(parent);
            }
        }
        Self { path }
    }

    pub fn load(&self) -> Result<EventBook> {
        if !self.path.exists() {
            return Ok(EventBook::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let book = serde_json::from_str(&data)?;
        Ok(book)
    }

    pub fn save(&self, book: &EventBook) -> Result<()> {
        let data = serde_json::to_string_pretty(book)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &data)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
