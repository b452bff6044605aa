use log::*;
use thiserror::Error;

/// errors, which can occur while reading the configuration from the environment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} expects a boolean, got '{value}'.")]
    InvalidBool { key: &'static str, value: String },
    #[error("{key} expects an unsigned integer, got '{value}'.")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be greater than zero.")]
    ZeroDimension { key: &'static str },
}

pub const APP_NAME: &str = "RENDERER_APP_NAME";
pub const WINDOW_WIDTH: &str = "RENDERER_WINDOW_WIDTH";
pub const WINDOW_HEIGHT: &str = "RENDERER_WINDOW_HEIGHT";
pub const VALIDATION: &str = "RENDERER_VALIDATION";
pub const DEBUG_UTILS: &str = "RENDERER_DEBUG_UTILS";
pub const REQUIRE_DISCRETE_GPU: &str = "RENDERER_REQUIRE_DISCRETE_GPU";

/// settings for window and Vulkan setup
///
/// everything has a default, so an empty environment yields a usable config;
/// validation and debug utils default to on for debug builds only
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub app_name: String,
    pub window_width: u32,
    pub window_height: u32,
    pub validation_layers: bool,
    pub debug_utils: bool,
    pub require_discrete_gpu: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Renderer".to_owned(),
            window_width: 1920,
            window_height: 1080,
            validation_layers: cfg!(debug_assertions),
            debug_utils: cfg!(debug_assertions),
            require_discrete_gpu: true,
        }
    }
}

impl Config {
    /// reads the config from the process environment (call dotenv before this,
    /// if a .env file should be considered)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// builds the config from an arbitrary key-value lookup, unset keys keep
    /// their default value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(APP_NAME) {
            config.app_name = name;
        }
        if let Some(value) = lookup(WINDOW_WIDTH) {
            config.window_width = parse_dimension(WINDOW_WIDTH, &value)?;
        }
        if let Some(value) = lookup(WINDOW_HEIGHT) {
            config.window_height = parse_dimension(WINDOW_HEIGHT, &value)?;
        }
        if let Some(value) = lookup(VALIDATION) {
            config.validation_layers = parse_bool(VALIDATION, &value)?;
        }
        if let Some(value) = lookup(DEBUG_UTILS) {
            config.debug_utils = parse_bool(DEBUG_UTILS, &value)?;
        }
        if let Some(value) = lookup(REQUIRE_DISCRETE_GPU) {
            config.require_discrete_gpu = parse_bool(REQUIRE_DISCRETE_GPU, &value)?;
        }

        debug!("{:?}", config);
        Ok(config)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_owned(),
        }),
    }
}

fn parse_dimension(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    let dimension = value
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidNumber {
            key,
            value: value.to_owned(),
        })?;

    if dimension == 0 {
        return Err(ConfigError::ZeroDimension { key });
    }
    Ok(dimension)
}
