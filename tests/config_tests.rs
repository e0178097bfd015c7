//! Algorithm configuration loading tests

use app_pack_generator::config::AlgorithmConfig;
use app_pack_generator::config::yaml::{load_config, read_config};
use app_pack_generator::error::AppPackError;
use app_pack_generator::system::{MockSystem, RealSystem};
use std::fs;
use tempfile::TempDir;

const CONFIG_PATH: &str = "/repo/algorithm_config.yml";

fn system_with(content: &str) -> MockSystem {
    MockSystem::new()
        .with_file(CONFIG_PATH, content.as_bytes())
        .unwrap()
}

#[test]
fn test_load_shipped_example() {
    let config =
        AlgorithmConfig::load_from_file(&RealSystem::new(), "data/algorithm_config.yml").unwrap();

    assert_eq!(config.process_id, "sample_print");
    assert_eq!(config.command, "/ogc_process_test/print_script.sh");
    assert_eq!(config.inputs.len(), 1);
    assert_eq!(config.outputs[0].glob, "./output*");
    assert_eq!(config.ram_min, Some(512));
}

#[test]
fn test_load_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("algorithm_config.yml");

    fs::write(
        &config_path,
        r#"
algorithm_name: disk_algo
docker_image: ghcr.io/org/disk:main
run_command: run.sh
inputs: []
outputs: []
"#,
    )
    .unwrap();

    let config = load_config(&RealSystem::new(), config_path.to_str().unwrap()).unwrap();
    assert_eq!(config.process_id, "disk_algo");
}

#[test]
fn test_missing_file() {
    let err = load_config(&MockSystem::new(), "/nowhere/algorithm_config.yml").unwrap_err();
    assert!(matches!(err, AppPackError::ConfigNotFound { .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("Configuration file not found"));
}

#[test]
fn test_malformed_yaml() {
    let system = system_with("algorithm_name: broken\ninputs: [\n");
    let err = load_config(&system, CONFIG_PATH).unwrap_err();
    assert!(matches!(err, AppPackError::ConfigParse { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_missing_inputs_key_fails_schema() {
    let system = system_with(
        r#"
algorithm_name: no_inputs
docker_image: ghcr.io/org/x:main
run_command: run.sh
outputs: []
"#,
    );
    let err = load_config(&system, CONFIG_PATH).unwrap_err();
    assert!(matches!(err, AppPackError::ConfigValidation { .. }));
    assert!(err.to_string().contains("inputs"));
}

#[test]
fn test_unknown_type_fails_schema() {
    let system = system_with(
        r#"
algorithm_name: bad_type
docker_image: ghcr.io/org/x:main
run_command: run.sh
inputs:
  - name: value
    type: str
outputs: []
"#,
    );
    let err = load_config(&system, CONFIG_PATH).unwrap_err();
    assert!(matches!(err, AppPackError::ConfigValidation { .. }));
    assert!(err.to_string().contains("Path '/inputs/0/type'"));
}

#[test]
fn test_missing_command_fails() {
    let system = system_with(
        r#"
algorithm_name: no_command
docker_image: ghcr.io/org/x:main
inputs: []
outputs: []
"#,
    );
    let err = load_config(&system, CONFIG_PATH).unwrap_err();
    assert!(matches!(err, AppPackError::ConfigValidation { .. }));
}

#[test]
fn test_duplicate_names_fail() {
    let system = system_with(
        r#"
algorithm_name: dupes
docker_image: ghcr.io/org/x:main
run_command: run.sh
inputs:
  - name: result
    type: string
outputs:
  - name: result
    type: File
"#,
    );
    let err = load_config(&system, CONFIG_PATH).unwrap_err();
    assert!(err.to_string().contains("Duplicate parameter name 'result'"));
}

#[test]
fn test_non_path_output_fails() {
    let system = system_with(
        r#"
algorithm_name: scalar_out
docker_image: ghcr.io/org/x:main
run_command: run.sh
inputs: []
outputs:
  - name: count
    type: int
"#,
    );
    let err = load_config(&system, CONFIG_PATH).unwrap_err();
    assert!(err.to_string().contains("use File or Directory"));
}

#[test]
fn test_missing_image_fails_full_load_but_not_read() {
    let system = system_with(
        r#"
algorithm_name: ci_image
run_command: run.sh
inputs: []
outputs: []
"#,
    );

    let err = load_config(&system, CONFIG_PATH).unwrap_err();
    assert!(err.to_string().contains("docker_image"));

    // The image may still come from the build context
    let config = read_config(&system, CONFIG_PATH).unwrap();
    assert_eq!(config.image, None);
}

#[test]
fn test_key_aliases() {
    let system = system_with(
        r#"
process_id: aliased
description: Uses the short key names
version: 1.5
image: ghcr.io/org/aliased:v1
command: run.sh
memory: 2048
cores: 2
disk: 4096
inputs:
  - name: scene
    type: File
    description: Input scene
    default: /data/scene.tif
outputs:
  - name: products
    type: Directory
"#,
    );

    let config = load_config(&system, CONFIG_PATH).unwrap();
    assert_eq!(config.process_id, "aliased");
    assert_eq!(config.description.as_deref(), Some("Uses the short key names"));
    assert_eq!(config.version.as_deref(), Some("1.5"));
    assert_eq!(config.image.as_deref(), Some("ghcr.io/org/aliased:v1"));
    assert_eq!(config.ram_min, Some(2048));
    assert_eq!(config.cores_min, Some(2));
    assert_eq!(config.outdir_max, Some(4096));
    assert_eq!(config.inputs[0].doc.as_deref(), Some("Input scene"));
    assert_eq!(config.outputs[0].glob, "./output*");

    let names: Vec<&str> = config.parameter_names().collect();
    assert_eq!(names, vec!["scene", "products"]);
}

#[test]
fn test_zero_resource_fails_schema() {
    let system = system_with(
        r#"
algorithm_name: zero
docker_image: ghcr.io/org/x:main
run_command: run.sh
ram_min: 0
inputs: []
outputs: []
"#,
    );
    let err = load_config(&system, CONFIG_PATH).unwrap_err();
    assert!(matches!(err, AppPackError::ConfigValidation { .. }));
}

#[test]
fn test_misspelled_key_is_ignored_not_applied() {
    let system = system_with(
        r#"
algorithm_name: typo
docker_image: ghcr.io/org/x:main
run_command: run.sh
ram_mn: 4096
inputs: []
outputs: []
"#,
    );

    let config = load_config(&system, CONFIG_PATH).unwrap();
    assert_eq!(config.ram_min, None);
    assert!(config.unset_optional_keys().contains(&"ram_min"));
    assert!(!config.unset_optional_keys().contains(&"docker_image"));
}

#[test]
fn test_shipped_example_sets_provenance_keys() {
    let config =
        AlgorithmConfig::load_from_file(&RealSystem::new(), "data/algorithm_config.yml").unwrap();
    assert_eq!(config.unset_optional_keys(), vec!["contributor", "citation"]);
}
