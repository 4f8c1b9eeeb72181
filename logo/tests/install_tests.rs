//! Global `log` logger installation. Kept in its own binary: a process can
//! install only one global logger.

use logo::testing::MemoryWriter;
use logo::{install, Level, LogConfig, LogError, LogFacade, LogOutput, SharedWriter};

#[test]
fn test_install_routes_log_macros() {
    let memory = MemoryWriter::new();
    let facade = LogFacade::from_config(
        LogConfig::default()
            .with_level(Level::Info)
            .with_output(LogOutput::Writer(SharedWriter::new(memory.clone()))),
    )
    .expect("memory sink always opens");

    install(facade.clone()).expect("first install succeeds");
    log::debug!("below threshold");
    log::info!("user {} signed in", "alice");
    log::warn!(target: "auth", "password expires soon");

    let records = memory.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["msg"], "user alice signed in");
    assert_eq!(records[0]["level"], "info");
    assert!(records[0]["caller"]
        .as_str()
        .is_some_and(|caller| caller.contains("install_tests.rs")));
    assert_eq!(records[1]["logger"], "auth");
    assert_eq!(records[1]["level"], "warn");

    assert!(matches!(install(facade), Err(LogError::AlreadyInstalled)));
}
