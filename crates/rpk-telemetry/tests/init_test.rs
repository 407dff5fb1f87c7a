//! Global subscriber installation. Kept in its own test binary because the
//! subscriber can only be installed once per process.

use rpk_telemetry::{TelemetryConfig, TelemetryError, active_config, init_telemetry};

#[test]
fn init_records_active_config_once() {
    assert!(active_config().is_none());

    let config = TelemetryConfig::new("rpk-test")
        .with_log_level("debug")
        .with_json_logs(true)
        .with_ansi(false);
    init_telemetry(config).unwrap();

    let active = active_config().unwrap();
    assert_eq!(active.service_name, "rpk-test");
    assert!(active.json_logs);

    let err = init_telemetry(TelemetryConfig::new("second")).unwrap_err();
    assert!(matches!(err, TelemetryError::LoggingInit(_)));
    assert_eq!(active_config().unwrap().service_name, "rpk-test");
}
