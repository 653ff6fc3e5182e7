//! CLI argument value parsers
//!
//! Custom validation functions for CLI arguments that go beyond what clap
//! can validate automatically.

use std::fs;
use std::path::PathBuf;

/// Validate port number is within valid range (1-65535)
pub fn validate_port(port_str: &str) -> Result<u16, String> {
    let port: u16 = port_str.parse().map_err(|_| {
        format!(
            "Port must be a valid number between 1 and 65535, got: '{}'",
            port_str
        )
    })?;

    if port == 0 {
        return Err("Port must be between 1 and 65535. Port 0 is not allowed.".to_string());
    }

    Ok(port)
}

/// Validate that a configuration file exists, is readable and has a
/// supported extension (.toml, .yaml, .yml)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "toml" | "yaml" | "yml"))
        .unwrap_or(false);
    if !supported {
        return Err(format!(
            "Configuration file must be .toml, .yaml or .yml: '{}'",
            path_str
        ));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!(
            "Cannot read configuration file '{}': {}",
            path_str, e
        )),
    }
}

/// Validate rollback steps is between 1 and 100
pub fn validate_rollback_steps(steps_str: &str) -> Result<u32, String> {
    let steps: u32 = steps_str.parse().map_err(|_| {
        format!(
            "Rollback steps must be a valid positive number, got: '{}'",
            steps_str
        )
    })?;

    if steps == 0 {
        return Err("Rollback steps must be greater than 0".to_string());
    }

    if steps > 100 {
        return Err("Rollback steps cannot exceed 100 for safety reasons".to_string());
    }

    Ok(steps)
}

/// Validate host address format (basic validation)
pub fn validate_host_address(host_str: &str) -> Result<String, String> {
    let host = host_str.trim();

    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }

    if host.contains(char::is_whitespace) {
        return Err("Host address cannot contain spaces".to_string());
    }

    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() != 4 || parts.iter().any(|part| part.parse::<u8>().is_err()) {
            return Err(format!("Invalid IPv4 address format: '{}'", host_str));
        }
        return Ok(host.to_string());
    }

    if host.len() > 253 {
        return Err("Host address is too long (maximum 253 characters)".to_string());
    }

    Ok(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_port_validation_valid_ports() {
        for port_str in ["1", "80", "443", "3000", "8080", "65535"] {
            assert!(validate_port(port_str).is_ok(), "Port {} should be valid", port_str);
        }
    }

    #[test]
    fn test_port_validation_invalid_ports() {
        for port_str in ["0", "65536", "99999", "abc", "-1", ""] {
            assert!(validate_port(port_str).is_err(), "Port {} should be invalid", port_str);
        }
    }

    #[test]
    fn test_host_validation_valid_hosts() {
        for host in [
            "localhost",
            "127.0.0.1",
            "0.0.0.0",
            "192.168.1.1",
            "example.com",
            "stockroom.internal",
        ] {
            assert!(validate_host_address(host).is_ok(), "Host {} should be valid", host);
        }
    }

    #[test]
    fn test_host_validation_invalid_hosts() {
        let too_long = "x".repeat(300);
        for host in ["", "   ", "host with spaces", "999.999.999.999", "10.0.1", too_long.as_str()] {
            assert!(
                validate_host_address(host).is_err(),
                "Host '{}' should be invalid",
                host
            );
        }
    }

    #[test]
    fn test_rollback_steps_validation() {
        for steps_str in ["1", "5", "100"] {
            assert!(validate_rollback_steps(steps_str).is_ok());
        }
        for steps_str in ["0", "101", "-1", "abc", ""] {
            assert!(
                validate_rollback_steps(steps_str).is_err(),
                "Steps '{}' should be invalid",
                steps_str
            );
        }
    }

    #[test]
    fn test_config_file_path_validation() {
        let dir = TempDir::new().unwrap();
        let toml_path = dir.path().join("stockroom.toml");
        let yaml_path = dir.path().join("stockroom.yaml");
        let ini_path = dir.path().join("stockroom.ini");
        for path in [&toml_path, &yaml_path, &ini_path] {
            std::fs::write(path, "").unwrap();
        }

        assert_eq!(
            validate_config_file_path(toml_path.to_str().unwrap()).unwrap(),
            toml_path
        );
        assert!(validate_config_file_path(yaml_path.to_str().unwrap()).is_ok());
        assert!(validate_config_file_path(ini_path.to_str().unwrap()).is_err());
        assert!(validate_config_file_path(dir.path().to_str().unwrap()).is_err());
        assert!(validate_config_file_path("/no/such/stockroom.toml").is_err());
    }
}
