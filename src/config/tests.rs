use super::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_matchgate_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("MATCHGATE_DATA_DIR");
        env::remove_var("MATCHGATE_AUTHORITY_TIMEOUT_MS");
        env::remove_var("MATCHGATE_SUGGESTION_LIMIT");
        env::remove_var("MATCHGATE_MAX_CANDIDATES");
        env::remove_var("MATCHGATE_STICKY_KEY");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.data_dir, PathBuf::from("./.data"));
    assert_eq!(config.authority_timeout, Duration::from_millis(500));
    assert_eq!(config.suggestion_limit, 5);
    assert_eq!(config.max_candidates, 200);
    assert_eq!(config.sticky_key, StickyKey::Raw);
}

#[test]
fn test_document_paths_live_under_data_dir() {
    let config = Config {
        data_dir: PathBuf::from("/var/lib/matchgate"),
        ..Default::default()
    };

    assert_eq!(
        config.cutover_path(),
        PathBuf::from("/var/lib/matchgate/cutover.json")
    );
    assert_eq!(
        config.metrics_path(),
        PathBuf::from("/var/lib/matchgate/metrics.json")
    );
    assert_eq!(
        config.learning_path(),
        PathBuf::from("/var/lib/matchgate/learning.json")
    );
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_matchgate_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.data_dir, PathBuf::from("./.data"));
    assert_eq!(config.authority_timeout, Duration::from_millis(500));
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_matchgate_env();

    with_env_vars(
        &[
            ("MATCHGATE_DATA_DIR", "/srv/matchgate"),
            ("MATCHGATE_AUTHORITY_TIMEOUT_MS", "250"),
            ("MATCHGATE_SUGGESTION_LIMIT", "10"),
            ("MATCHGATE_MAX_CANDIDATES", "50"),
            ("MATCHGATE_STICKY_KEY", "normalized"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(config.data_dir, PathBuf::from("/srv/matchgate"));
            assert_eq!(config.authority_timeout, Duration::from_millis(250));
            assert_eq!(config.suggestion_limit, 10);
            assert_eq!(config.max_candidates, 50);
            assert_eq!(config.sticky_key, StickyKey::Normalized);
        },
    );
}

#[test]
#[serial]
fn test_invalid_timeout_not_number() {
    clear_matchgate_env();

    with_env_vars(&[("MATCHGATE_AUTHORITY_TIMEOUT_MS", "soon")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::NumberParseError { .. }));
        assert!(err.to_string().contains("MATCHGATE_AUTHORITY_TIMEOUT_MS"));
    });
}

#[test]
#[serial]
fn test_invalid_timeout_zero() {
    clear_matchgate_env();

    with_env_vars(&[("MATCHGATE_AUTHORITY_TIMEOUT_MS", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::ZeroValue { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_sticky_key() {
    clear_matchgate_env();

    with_env_vars(&[("MATCHGATE_STICKY_KEY", "sha256")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStickyKey { .. }));
        assert!(err.to_string().contains("sha256"));
    });
}

#[test]
#[serial]
fn test_invalid_limit_falls_back_to_default() {
    clear_matchgate_env();

    with_env_vars(&[("MATCHGATE_SUGGESTION_LIMIT", "lots")], || {
        let config = Config::from_env().expect("should parse with fallback");
        assert_eq!(config.suggestion_limit, 5);
    });
}

#[test]
fn test_validate_data_dir_is_file() {
    let config = Config {
        data_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}

#[test]
fn test_validate_rejects_zero_limits() {
    let config = Config {
        suggestion_limit: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroValue { .. })
    ));

    let config = Config {
        max_candidates: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroValue { .. })
    ));
}

#[test]
fn test_validate_success_with_defaults() {
    assert!(Config::default().validate().is_ok());
}
