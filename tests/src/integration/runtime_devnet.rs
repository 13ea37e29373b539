//! # Runtime Devnet
//!
//! The `relay-runtime` entry point driven by environment-style config,
//! with durable validator stores.

#[cfg(test)]
mod tests {
    use relay_runtime::config::{ConfigError, RuntimeConfig};
    use relay_runtime::devnet;
    use std::collections::HashMap;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::timeout;
    use tokio_util::sync::CancellationToken;

    fn config_from(vars: &[(&str, String)]) -> Result<RuntimeConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let config = RuntimeConfig::from_lookup(|var| vars.get(var).cloned())?;
        config.validate()?;
        Ok(config)
    }

    #[tokio::test]
    async fn test_devnet_with_durable_stores() {
        let dir = TempDir::new().unwrap();
        let config = config_from(&[
            ("WR_VALIDATORS", "4".into()),
            ("WR_THRESHOLD", "3".into()),
            ("WR_WORKERS", "2".into()),
            ("WR_MESSAGES_PER_WORKER", "2".into()),
            ("WR_POLL_INTERVAL_MS", "5".into()),
            ("WR_DATA_DIR", dir.path().display().to_string()),
        ])
        .unwrap();

        let report = timeout(
            Duration::from_secs(30),
            devnet::run(&config, CancellationToken::new()),
        )
        .await
        .unwrap()
        .unwrap();

        assert!(report.is_success(), "{:?}", report);
        assert_eq!(report.deliveries.len(), 4);
        for i in 0..4 {
            assert!(dir.path().join(format!("validator-{}", i)).is_dir());
        }
    }

    #[tokio::test]
    async fn test_devnet_rerun_over_existing_stores() {
        let dir = TempDir::new().unwrap();
        let config = config_from(&[
            ("WR_VALIDATORS", "3".into()),
            ("WR_THRESHOLD", "2".into()),
            ("WR_WORKERS", "1".into()),
            ("WR_MESSAGES_PER_WORKER", "3".into()),
            ("WR_POLL_INTERVAL_MS", "5".into()),
            ("WR_DATA_DIR", dir.path().display().to_string()),
        ])
        .unwrap();

        // Fresh keys on the second run must re-sign what is already stored
        for _ in 0..2 {
            let report = timeout(
                Duration::from_secs(30),
                devnet::run(&config, CancellationToken::new()),
            )
            .await
            .unwrap()
            .unwrap();
            assert!(report.is_success(), "{:?}", report);
        }
    }

    #[tokio::test]
    async fn test_shutdown_before_start_signs_nothing() {
        let config = config_from(&[
            ("WR_VALIDATORS", "3".into()),
            ("WR_THRESHOLD", "2".into()),
        ])
        .unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let report = timeout(Duration::from_secs(30), devnet::run(&config, shutdown))
            .await
            .unwrap()
            .unwrap();

        assert!(!report.timed_out);
        assert!(!report.is_success());
        assert!(report.completed.is_empty());
        assert!(report.deliveries.is_empty());
        assert!(report.clients.iter().all(|c| c.exit == "Cancelled"));
    }

    #[test]
    fn test_unsatisfiable_threshold_rejected() {
        let err = config_from(&[
            ("WR_VALIDATORS", "3".into()),
            ("WR_THRESHOLD", "4".into()),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::ThresholdTooHigh { .. }));
    }
}
