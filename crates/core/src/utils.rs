use crate::Result;
use std::path::Path;

pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists()
}

pub fn read_file_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let content = std::fs::read_to_string(path)?;
    Ok(content)
}

pub fn write_string_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}

pub fn format_ron_pretty<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
    let config = ron::ser::PrettyConfig::default();
    let content = ron::ser::to_string_pretty(data, config)?;
    Ok(content)
}

pub fn parse_ron<T: serde::de::DeserializeOwned>(content: &str) -> Result<T> {
    let data: T = ron::from_str(content)?;
    Ok(data)
}