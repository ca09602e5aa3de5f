//! Startup diagnostics: verify secrets and audio prerequisites.
//!
//! `livenote check` runs everything here and reports line by line, so a
//! misconfigured machine fails fast instead of mid-session.

use crate::audio::capture::list_devices;
use crate::config::Secrets;

/// Result of one diagnostic check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Prerequisite is satisfied
    Ok,
    /// Prerequisite is missing, with guidance
    Missing(String),
}

/// Check that one environment secret is set and non-empty.
fn check_secret(name: &str) -> CheckResult {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => CheckResult::Ok,
        _ => CheckResult::Missing(format!("environment variable {} is not set", name)),
    }
}

/// Check that at least one audio input device exists.
fn check_audio_input() -> CheckResult {
    match list_devices() {
        Ok(devices) if !devices.is_empty() => CheckResult::Ok,
        Ok(_) => CheckResult::Missing("no audio input devices found".to_string()),
        Err(e) => CheckResult::Missing(format!("device enumeration failed: {}", e)),
    }
}

/// Run all diagnostics and print a report. Returns true if everything passed.
pub fn check_prerequisites() -> bool {
    let mut all_ok = true;

    println!("livenote prerequisites:");

    for name in [
        Secrets::ASR_KEY_VAR,
        Secrets::NOTE_TOKEN_VAR,
        Secrets::NOTE_ID_VAR,
    ] {
        match check_secret(name) {
            CheckResult::Ok => println!("  [ok]      {}", name),
            CheckResult::Missing(detail) => {
                all_ok = false;
                println!("  [missing] {}", detail);
            }
        }
    }

    match check_audio_input() {
        CheckResult::Ok => println!("  [ok]      audio input device"),
        CheckResult::Missing(detail) => {
            all_ok = false;
            println!("  [missing] audio input: {}", detail);
        }
    }

    if all_ok {
        println!("\nAll checks passed.");
    } else {
        println!("\nSome checks failed. Fix the items above and re-run `livenote check`.");
    }

    all_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_env(key: &str, value: &str) {
        // SAFETY: guarded by ENV_LOCK in every test that calls this
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    #[test]
    fn test_check_secret_present() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env("LIVENOTE_TEST_SECRET", "value");
        assert_eq!(check_secret("LIVENOTE_TEST_SECRET"), CheckResult::Ok);
        remove_env("LIVENOTE_TEST_SECRET");
    }

    #[test]
    fn test_check_secret_absent() {
        let _guard = ENV_LOCK.lock().unwrap();
        remove_env("LIVENOTE_TEST_ABSENT");
        match check_secret("LIVENOTE_TEST_ABSENT") {
            CheckResult::Missing(detail) => assert!(detail.contains("LIVENOTE_TEST_ABSENT")),
            CheckResult::Ok => panic!("Expected Missing"),
        }
    }

    #[test]
    fn test_check_secret_whitespace_is_missing() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env("LIVENOTE_TEST_BLANK", "  ");
        assert_ne!(check_secret("LIVENOTE_TEST_BLANK"), CheckResult::Ok);
        remove_env("LIVENOTE_TEST_BLANK");
    }
}
