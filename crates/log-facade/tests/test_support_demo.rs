//! Demonstrates the test support functionality

#[cfg(feature = "test-support")]
mod tests {
    use proven_log_facade::test_support::*;
    use proven_log_facade::*;
    use serial_test::serial;
    use std::io;

    #[test]
    fn test_capture_backend() {
        // Create a capture backend and take a logger from it directly
        let capture = CaptureBackend::new();
        let logger = capture.logger("demo");

        logger.info("This is captured");
        logger.error_err("This is also captured", &io::Error::other("cause"));

        // Check the captured logs
        assert!(capture.contains("INFO [demo] This is captured"));
        assert!(capture.contains("ERROR [demo] This is also captured: cause"));
        assert_eq!(capture.records().len(), 2);

        capture.clear();
        assert!(capture.records().is_empty());
    }

    #[test]
    #[serial]
    #[should_panic(expected = "intentional")]
    fn test_guard_prints_logs_on_failure() {
        let guard = TestLogGuard::new("test_guard_prints_logs_on_failure");
        let logger = logger!();

        info!(logger, "Starting failing test");
        warn!(logger, "About to fail");
        assert!(guard.backend().contains("About to fail"));
        // When this test fails, all the logs will be printed
        panic!("intentional");
    }

    #[test]
    #[serial]
    fn test_with_manual_guard() {
        let mut guard = TestLogGuard::new("test_with_manual_guard");
        let logger = LoggerFactory::get("manual");

        info!(logger, "Manual test starting");
        for i in 0..3 {
            debug!(logger, "Iteration {}", i);
        }
        let ours = guard
            .backend()
            .records()
            .into_iter()
            .filter(|record| record.logger == "manual")
            .count();
        assert_eq!(ours, 4);

        // Test passes, so mark it
        guard.passed();
    }
}
