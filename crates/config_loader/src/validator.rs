//! 配置校验模块
//!
//! 校验规则：
//! - anchor_stream 非空
//! - interpolation.min_samples >= 2
//! - time_keys 非空、名称唯一、scale 为有限正数
//! - schema 字段名非空、唯一、不与 time key 冲突
//! - schema 字段名不能是 `timestamp`
//! - logging.level 非空，且可解析为 tracing filter directive

use std::collections::HashSet;

use contracts::{ContractError, FlightSyncConfig, TIMESTAMP_FIELD};
use tracing_subscriber::EnvFilter;

/// 校验 FlightSyncConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &FlightSyncConfig) -> Result<(), ContractError> {
    validate_anchor(config)?;
    validate_interpolation(config)?;
    validate_time_keys(config)?;
    validate_schemas(config)?;
    validate_logging(config)?;
    Ok(())
}

/// 校验主时钟流
fn validate_anchor(config: &FlightSyncConfig) -> Result<(), ContractError> {
    if config.anchor_stream.trim().is_empty() {
        return Err(ContractError::config_validation(
            "anchor_stream",
            "anchor_stream cannot be empty",
        ));
    }
    Ok(())
}

/// 校验插值分组阈值
fn validate_interpolation(config: &FlightSyncConfig) -> Result<(), ContractError> {
    let min_samples = config.interpolation.min_samples;
    if min_samples < 2 {
        return Err(ContractError::config_validation(
            "interpolation.min_samples",
            format!("min_samples must be >= 2, got {min_samples}"),
        ));
    }
    Ok(())
}

/// 校验时间字段
fn validate_time_keys(config: &FlightSyncConfig) -> Result<(), ContractError> {
    let keys = &config.normalize.time_keys;
    if keys.is_empty() {
        return Err(ContractError::config_validation(
            "normalize.time_keys",
            "at least one time key is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, key) in keys.iter().enumerate() {
        if key.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("normalize.time_keys[{idx}].name"),
                "time key name cannot be empty",
            ));
        }
        if !seen.insert(key.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("normalize.time_keys[name={}]", key.name),
                "duplicate time key",
            ));
        }
        if !key.scale.is_finite() || key.scale <= 0.0 {
            return Err(ContractError::config_validation(
                format!("normalize.time_keys[name={}].scale", key.name),
                format!("scale must be finite and > 0, got {}", key.scale),
            ));
        }
    }
    Ok(())
}

/// 校验显式 schema
fn validate_schemas(config: &FlightSyncConfig) -> Result<(), ContractError> {
    for (stream, schema) in &config.normalize.schemas {
        let mut seen = HashSet::new();
        for field in schema.numeric.iter().chain(schema.text.iter()) {
            let path = format!("normalize.schemas.{stream}[{field}]");
            if field.is_empty() {
                return Err(ContractError::config_validation(
                    path,
                    "field name cannot be empty",
                ));
            }
            if field == TIMESTAMP_FIELD {
                return Err(ContractError::config_validation(
                    path,
                    "`timestamp` is reserved for the record time",
                ));
            }
            if config.normalize.is_time_key(field) {
                return Err(ContractError::config_validation(
                    path,
                    "field collides with a time key",
                ));
            }
            if !seen.insert(field.as_str()) {
                return Err(ContractError::config_validation(path, "duplicate field"));
            }
        }
    }
    Ok(())
}

/// 校验日志配置
fn validate_logging(config: &FlightSyncConfig) -> Result<(), ContractError> {
    if config.logging.level.trim().is_empty() {
        return Err(ContractError::config_validation(
            "logging.level",
            "log level cannot be empty",
        ));
    }
    if let Err(e) = EnvFilter::try_new(&config.logging.level) {
        return Err(ContractError::config_validation(
            "logging.level",
            format!("invalid filter directive '{}': {e}", config.logging.level),
        ));
    }
    Ok(())
}
