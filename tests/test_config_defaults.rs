use pretty_assertions::assert_eq;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use testrun::{
    run::{Command, Config, env::HTTP_ENABLED},
    testing::{Overrides, TestRunCommand, bound_http_addr},
};
use tokio_util::sync::CancellationToken;

use harness::{CleanupGuard, env, init_tracing};

mod harness;

fn fixture(name: &str) -> PathBuf {
    let pkg_root = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(format!("{pkg_root}/tests/data/config/{name}"))
}

#[test]
fn default_config() {
    let config = Config::default();

    assert!(!config.reporting_disabled);
    assert_eq!(config.bind_address, "127.0.0.1:8088");
    assert!(config.http.enabled);
    assert_eq!(config.http.bind_address, "127.0.0.1:8086");
    assert!(config.rpc.enabled);
    assert!(config.data.dir.ends_with(".testrun/data"));
    assert!(config.data.wal_dir.ends_with(".testrun/wal"));
    assert!(config.meta.dir.ends_with(".testrun/meta"));
}

#[test]
fn empty_document_is_the_default() -> anyhow::Result<()> {
    assert_eq!(Config::parse_yaml(b"")?, Config::default());
    assert_eq!(Config::parse_yaml(b"\n  \n")?, Config::default());
    assert_eq!(Config::parse_yaml(b"{}")?, Config::default());
    Ok(())
}

#[test]
fn full_config_file() -> anyhow::Result<()> {
    let config = Config::from_yaml_file(&fixture("full.yaml"))?;

    assert!(config.reporting_disabled);
    assert_eq!(config.bind_address, "127.0.0.1:18088");
    assert_eq!(config.meta.dir, PathBuf::from("/var/lib/testrun/meta"));
    assert_eq!(config.data.dir, PathBuf::from("/var/lib/testrun/data"));
    assert_eq!(config.data.wal_dir, PathBuf::from("/var/lib/testrun/wal"));
    assert!(!config.http.enabled);
    assert_eq!(config.http.bind_address, "127.0.0.1:18086");
    assert!(config.rpc.enabled);
    Ok(())
}

#[test]
fn config_file_must_be_a_mapping() {
    assert!(Config::from_yaml_file(&fixture("not_a_mapping.yaml")).is_err());
    assert!(Config::from_yaml_file(&fixture("does_not_exist.yaml")).is_err());
}

#[test]
fn overrides_replace_file_values() -> anyhow::Result<()> {
    let mut config = Config::from_yaml_file(&fixture("full.yaml"))?;
    let overrides = Overrides::new(env(&[(HTTP_ENABLED, "true")]), "/tmp/testrun-x");
    config.apply_env(&overrides)?;

    assert!(config.http.enabled);
    assert_eq!(config.http.bind_address, "localhost:0");
    assert_eq!(config.bind_address, "localhost:0");
    assert_eq!(config.data.dir, PathBuf::from("/tmp/testrun-x/data"));
    assert_eq!(config.meta.dir, PathBuf::from("/tmp/testrun-x/meta"));
    assert_eq!(config.data.wal_dir, PathBuf::from("/tmp/testrun-x/wal"));
    assert!(config.reporting_disabled);
    Ok(())
}

#[test]
fn empty_overrides_keep_file_values() -> anyhow::Result<()> {
    let mut config = Config::from_yaml_file(&fixture("full.yaml"))?;
    let overrides = Overrides::new(env(&[("BIND_ADDRESS", "")]), "/tmp/testrun-x");
    config.apply_env(&overrides)?;

    assert_eq!(config.bind_address, "127.0.0.1:18088");
    Ok(())
}

#[test]
fn invalid_override_names_the_key() {
    let mut config = Config::default();
    let overrides = Overrides::new(env(&[("RPC_ENABLED", "yes")]), "/tmp/testrun-x");

    let err = config.apply_env(&overrides).unwrap_err();
    assert!(format!("{err:#}").contains("RPC_ENABLED"));
}

#[test]
fn validation() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.http.bind_address.clear();
    assert!(config.validate().is_err());
    config.http.enabled = false;
    assert!(config.validate().is_ok());

    config.bind_address.clear();
    assert!(config.validate().is_err());
    config.rpc.enabled = false;
    assert!(config.validate().is_ok());

    config.data.wal_dir = PathBuf::new();
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn harness_overrides_win_over_config_file() {
    init_tracing();
    let harness = TestRunCommand::new(HashMap::new());
    let _guard = CleanupGuard(&harness);

    let command = Command::with_source(Arc::new(Overrides::new(HashMap::new(), harness.dir())));
    let cancel = CancellationToken::new();
    command
        .run(cancel.clone(), Some(fixture("privileged_ports.yaml").as_path()))
        .await
        .unwrap();

    let addr = bound_http_addr(&command).await;
    assert!(!addr.ends_with(":2"), "{addr}");
    cancel.cancel();
}

#[cfg(unix)]
#[tokio::test]
async fn dev_null_means_defaults_plus_overrides() {
    init_tracing();
    let harness = TestRunCommand::new(HashMap::new());
    let _guard = CleanupGuard(&harness);

    let command = Command::with_source(Arc::new(Overrides::new(HashMap::new(), harness.dir())));
    command
        .run(CancellationToken::new(), Some(Path::new("/dev/null")))
        .await
        .unwrap();

    assert!(harness.dir().join("wal").is_dir());
    command.close().await;
}
