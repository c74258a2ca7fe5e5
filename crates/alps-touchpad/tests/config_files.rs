//! Loading session configuration from disk.

use std::io::Write;

use alps_touchpad::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn test_load_yaml_file() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        "tracker:\n  grace_frames: 2\ntrackpoint_divisor: 2\ngeometry:\n  x_max: 4095\n  y_max: 2047\n  x_bits: 23\n  y_bits: 12\n  x_res: 40"
    )?;

    let config = TouchpadConfig::load(file.path())?;
    assert_eq!(config.tracker.grace_frames, 2);
    assert_eq!(config.trackpoint_divisor, Some(2));
    let geometry = config.geometry.ok_or("missing geometry")?;
    assert_eq!((geometry.x_max, geometry.y_max), (4095, 2047));
    assert_eq!((geometry.x_res, geometry.y_res), (Some(40), None));

    let pad = AlpsTouchpad::from_reports([0x73, 0x00, 0x14], [0, 0, 0], config)?;
    assert_eq!(pad.geometry().x_bits, 23);
    assert_eq!(pad.tracker().config().grace_frames, 2);
    Ok(())
}

#[test]
fn test_missing_file_is_io_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let err = TouchpadConfig::load(dir.path().join("absent.yaml"));
    assert!(matches!(err, Err(AlpsError::Io(_))));
    Ok(())
}

#[test]
fn test_invalid_grace_rejected_on_load() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "tracker:\n  grace_frames: 1000")?;
    let err = TouchpadConfig::load(file.path());
    let Err(err) = err else {
        return Err("expected a config error".into());
    };
    insta::assert_snapshot!(
        err.to_string(),
        @"Configuration error: grace_frames must be at most 100, got 1000"
    );
    Ok(())
}

#[test]
fn test_saved_config_loads_back() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("touchpad.yaml");
    let config = TouchpadConfig {
        trackpoint_divisor: Some(3),
        ..TouchpadConfig::default()
    };
    std::fs::write(&path, config.to_yaml_string()?)?;
    assert_eq!(TouchpadConfig::load(&path)?, config);
    Ok(())
}
