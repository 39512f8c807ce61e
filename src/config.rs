use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub camera: CameraConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    pub device_index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatConfig {
    /// Model identifier, e.g. "gemini-2.0-flash"
    pub model: String,
    /// API base URL
    pub api_base: String,
    /// Name of the environment variable holding the API key. The key
    /// itself never appears in config files.
    pub api_key_env: String,
    /// Fixed system instruction for the interviewer
    pub system_instruction: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
