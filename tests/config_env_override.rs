use serial_test::serial;
use std::fs;
use tempfile::tempdir;

use superpath::{default_config_path, default_log_path, load_config, LogLevel};

#[test]
#[serial]
fn env_override_selects_config_and_colocates_log() {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    let cfg = base.join("custom_config.xml");
    let home = base.join("home");
    fs::write(
        &cfg,
        format!(
            "<config>\n  <home>{}</home>\n  <log_level>debug</log_level>\n</config>",
            home.display()
        ),
    )
    .unwrap();

    // Process-wide env; serialized with the other env tests.
    unsafe {
        std::env::set_var("SUPERPATH_CONFIG", &cfg);
    }

    let resolved_cfg = default_config_path().expect("default_config_path");
    assert_eq!(resolved_cfg, cfg, "config path should equal SUPERPATH_CONFIG value");
    let resolved_log = default_log_path().expect("default_log_path");
    assert_eq!(resolved_log.parent(), cfg.parent(), "log should sit next to config");

    let loaded = load_config().expect("load_config");
    assert_eq!(loaded.folders.home, home);
    assert_eq!(loaded.log_level, LogLevel::Debug);
    assert_eq!(loaded.folders.docs().as_path(), home.join("Documents"));

    unsafe {
        std::env::remove_var("SUPERPATH_CONFIG");
    }
}

#[test]
#[serial]
fn env_directory_gets_config_xml_appended() {
    let td = tempdir().unwrap();
    let dir = fs::canonicalize(td.path()).unwrap();

    unsafe {
        std::env::set_var("SUPERPATH_CONFIG", &dir);
    }
    let resolved = default_config_path().expect("default_config_path");
    assert_eq!(resolved, dir.join("config.xml"));

    // Explicitly named but missing: loading must fail rather than fall back.
    assert!(load_config().is_err());

    unsafe {
        std::env::remove_var("SUPERPATH_CONFIG");
    }
}
