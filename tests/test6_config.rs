use objstore_csv_mgr::config::{AppConfig, REQUIRED_VARS, parse_env_str, read_env_file};
use objstore_csv_mgr::errors::ConfigError;
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_FILE: &str = "\
# storage credentials
ACCESS_KEY=AKIAEXAMPLE123
SECRET_KEY=very-secret
ENDPOINT_URL=https://axl55ulgxbqk.compat.objectstorage.il-jerusalem-1.oraclecloud.com
REGION=il-jerusalem-1
BUCKET_NAME=bucket-000002
INPUT_FILE_KEY=input/data.csv
OUTPUT_FILE_KEY=output/data_processed.csv
";

fn full_vars() -> HashMap<String, String> {
    parse_env_str(ENV_FILE).expect("env content parses")
}

#[test]
fn env_content_maps_onto_config() -> Result<(), Box<dyn std::error::Error>> {
    let vars = full_vars();
    let config = AppConfig::from_lookup(|name| vars.get(name).cloned())?;

    assert_eq!(config.storage.access_key, "AKIAEXAMPLE123");
    assert_eq!(config.storage.secret_key, "very-secret");
    assert_eq!(config.storage.region, "il-jerusalem-1");
    assert!(config.storage.endpoint.starts_with("https://axl55ulgxbqk.compat"));
    assert_eq!(config.bucket, "bucket-000002");
    assert_eq!(config.input_key, "input/data.csv");
    assert_eq!(config.output_key, "output/data_processed.csv");
    Ok(())
}

#[test]
fn each_missing_variable_is_named() {
    for missing in REQUIRED_VARS {
        let mut vars = full_vars();
        vars.remove(missing);

        match AppConfig::from_lookup(|name| vars.get(name).cloned()) {
            Err(ConfigError::Missing(name)) => assert_eq!(name, missing),
            other => panic!("expected Missing({missing}), got {other:?}"),
        }
    }
}

#[test]
fn empty_value_counts_as_missing() {
    let mut vars = full_vars();
    vars.insert("REGION".to_string(), "  ".to_string());

    let err = AppConfig::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
    assert_eq!(err.to_string(), "Missing required environment variable: REGION");
}

#[test]
fn env_file_is_read_from_disk() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(ENV_FILE.as_bytes())?;

    let vars = read_env_file(file.path())?;

    assert_eq!(vars.len(), REQUIRED_VARS.len());
    assert_eq!(vars.get("BUCKET_NAME").map(String::as_str), Some("bucket-000002"));
    Ok(())
}

#[test]
fn explicit_env_file_must_exist() {
    let result = AppConfig::load(Some(std::path::Path::new(
        "/definitely/not/a/real/dir/.env",
    )));
    assert!(matches!(result, Err(ConfigError::EnvFile { .. })));
}

#[test]
fn debug_output_masks_secrets() -> Result<(), Box<dyn std::error::Error>> {
    let vars = full_vars();
    let config = AppConfig::from_lookup(|name| vars.get(name).cloned())?;

    let shown = format!("{config:?}");
    assert!(!shown.contains("very-secret"));
    assert!(!shown.contains("AKIAEXAMPLE123"));
    assert!(shown.contains("AKIA****"));
    Ok(())
}

#[test]
fn backslashes_and_export_prefix_survive_parsing() -> Result<(), Box<dyn std::error::Error>> {
    let vars = parse_env_str("SECRET_KEY=ab\\cd/ef\nexport REGION=il-jerusalem-1\n")?;

    assert_eq!(vars.get("SECRET_KEY").map(String::as_str), Some("ab\\cd/ef"));
    assert_eq!(vars.get("REGION").map(String::as_str), Some("il-jerusalem-1"));
    assert!(!vars.contains_key("export REGION"));
    Ok(())
}

#[test]
fn exported_env_file_builds_full_config() -> Result<(), Box<dyn std::error::Error>> {
    let exported: String = ENV_FILE
        .lines()
        .map(|line| {
            if line.starts_with('#') {
                format!("{line}\n")
            } else {
                format!("export {line}\n")
            }
        })
        .collect();
    let vars = parse_env_str(&exported)?;

    let config = AppConfig::from_lookup(|name| vars.get(name).cloned())?;
    assert_eq!(config.bucket, "bucket-000002");
    Ok(())
}
