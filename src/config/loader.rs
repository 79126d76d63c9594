//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::application::ports::VoiceSettings;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 旧版本使用的 API key 环境变量
pub const LEGACY_API_KEY_VAR: &str = "ELEVEN_LABS_API_KEY";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `READTOME_`，层级分隔符 `__`）
/// 2. 配置文件：`config_path`，为 None 时搜索 config.toml 或 config.local.toml
/// 3. 默认值
///
/// 未设置 `READTOME_ELEVENLABS__API_KEY` 时回退到 `ELEVEN_LABS_API_KEY`。
///
/// # 环境变量示例
/// - `READTOME_ELEVENLABS__VOICE_ID=21m00Tcm4TlvDq8ikWAM`
/// - `READTOME_ELEVENLABS__VOICE_SETTINGS__STABILITY=0.5`
/// - `READTOME_CHUNKING__MAX_CHARS=2500`
/// - `READTOME_PLAYBACK__ENABLED=false`
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    let voice = VoiceSettings::default();
    builder = builder
        .set_default("elevenlabs.base_url", "https://api.elevenlabs.io")?
        .set_default("elevenlabs.voice_id", "21m00Tcm4TlvDq8ikWAM")?
        .set_default("elevenlabs.model_id", "eleven_monolingual_v1")?
        .set_default("elevenlabs.timeout_secs", 120)?
        .set_default("elevenlabs.voice_settings.stability", voice.stability as f64)?
        .set_default(
            "elevenlabs.voice_settings.similarity_boost",
            voice.similarity_boost as f64,
        )?
        .set_default("elevenlabs.voice_settings.style", voice.style as f64)?
        .set_default(
            "elevenlabs.voice_settings.use_speaker_boost",
            voice.use_speaker_boost,
        )?
        .set_default("chunking.max_chars", 4000)?
        .set_default("output.dir", "outputs")?
        .set_default("playback.enabled", true)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: READTOME_
    // 层级分隔符: __ (双下划线)
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("READTOME")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let mut app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    apply_legacy_api_key(&mut app_config, std::env::var(LEGACY_API_KEY_VAR).ok());

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 未配置 API key 时使用旧变量的值
fn apply_legacy_api_key(config: &mut AppConfig, legacy: Option<String>) {
    if config.elevenlabs.api_key().is_none() {
        if let Some(key) = legacy {
            tracing::debug!("Using API key from {}", LEGACY_API_KEY_VAR);
            config.elevenlabs.api_key = Some(key);
        }
    }
}

/// 验证配置有效性
///
/// 缺少 API key 不是配置错误，运行时才报告。
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let el = &config.elevenlabs;

    if el.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "ElevenLabs base URL cannot be empty".to_string(),
        ));
    }

    if el.voice_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Voice ID cannot be empty".to_string(),
        ));
    }

    if el.model_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Model ID cannot be empty".to_string(),
        ));
    }

    if el.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Request timeout cannot be 0".to_string(),
        ));
    }

    let settings = &el.voice_settings;
    for (name, value) in [
        ("stability", settings.stability),
        ("similarity_boost", settings.similarity_boost),
        ("style", settings.style),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::ValidationError(format!(
                "Voice setting {} must be within [0, 1], got {}",
                name, value
            )));
        }
    }

    if config.chunking.max_chars == 0 {
        return Err(ConfigError::ValidationError(
            "Chunk size cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    let el = &config.elevenlabs;
    tracing::info!("=== Application Configuration ===");
    tracing::info!("ElevenLabs URL: {}", el.base_url);
    tracing::info!("API Key: {}", el.masked_api_key());
    tracing::info!("Voice: {} (model {})", el.voice_id, el.model_id);
    tracing::info!(
        "Voice Settings: stability={} similarity_boost={} style={} speaker_boost={}",
        el.voice_settings.stability,
        el.voice_settings.similarity_boost,
        el.voice_settings.style,
        el.voice_settings.use_speaker_boost
    );
    tracing::info!("Request Timeout: {}s", el.timeout_secs);
    tracing::info!("Max Chars Per Chunk: {}", config.chunking.max_chars);
    tracing::info!("Output Directory: {:?}", config.output.dir);
    tracing::info!("Playback Enabled: {}", config.playback.enabled);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
