//! Configuration Tests

use crate::*;
use std::fs;

#[test]
fn test_open_from_toml_file() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let logs = temp_dir.path().join("logs");
    fs::create_dir(&logs).unwrap();
    let config_path = temp_dir.path().join("crashlog.toml");
    fs::write(
        &config_path,
        format!(
            "directory = {:?}\nsession_id = \"from-config\"\nclear_policy = \"all\"\n",
            logs.to_string_lossy()
        ),
    )
    .unwrap();

    let config = CrashLogConfig::from_file(&config_path).unwrap();
    let log = CrashLog::from_config(&config).unwrap();

    assert_eq!(log.directory(), logs.as_path());
    assert_eq!(log.session().as_str(), "from-config");
    assert_eq!(log.clear_policy(), ClearPolicy::All);

    let path = log.capture(&Failure::new("E", "configured")).unwrap();
    assert_eq!(path.parent(), Some(logs.as_path()));
}

#[test]
fn test_config_pointing_at_missing_directory() {
    let config = CrashLogConfig::from_toml_str(r#"directory = "/no/such/crashlog/dir""#).unwrap();
    let err = CrashLog::from_config(&config).unwrap_err();
    assert!(err.is_directory_unavailable());
}

#[tokio::test]
async fn test_configured_tcp_probe_drives_drain() {
    let (_dir, log) = create_log();
    log.capture(&Failure::new("E", "waiting"));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let config = CrashLogConfig::from_toml_str(&format!(
        "directory = \"/unused\"\n[probe]\naddress = \"{}\"\ntimeout_ms = 2000\n",
        address
    ))
    .unwrap();

    let probe = config.tcp_probe().unwrap();
    let outcome = log.coordinator(probe, TracingSink).drain().await;

    assert_eq!(outcome.stats().unwrap().forwarded, 1);
}
