//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CardiomaskConfig;
use crate::domain::errors::CardiomaskError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`CardiomaskConfig`]
/// 4. Applies environment variable overrides (`CARDIOMASK_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
pub fn load_config(path: impl AsRef<Path>) -> Result<CardiomaskConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CardiomaskError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CardiomaskError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CardiomaskConfig = toml::from_str(&contents)
        .map_err(|e| CardiomaskError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        CardiomaskError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CardiomaskError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the CARDIOMASK_* prefix
///
/// Environment variables follow the pattern: CARDIOMASK_<SECTION>_<KEY>
/// For example: CARDIOMASK_SERVER_BIND_ADDRESS, CARDIOMASK_DATABASE_PATH
fn apply_env_overrides(config: &mut CardiomaskConfig) {
    if let Ok(val) = std::env::var("CARDIOMASK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("CARDIOMASK_SERVER_BIND_ADDRESS") {
        config.server.bind_address = val;
    }
    if let Ok(val) = std::env::var("CARDIOMASK_SERVER_ALLOWED_ORIGIN") {
        config.server.allowed_origin = val;
    }

    if let Ok(val) = std::env::var("CARDIOMASK_DATABASE_PATH") {
        config.database.path = val;
    }

    if let Ok(val) = std::env::var("CARDIOMASK_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }

    if let Ok(val) = std::env::var("CARDIOMASK_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("CARDIOMASK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
