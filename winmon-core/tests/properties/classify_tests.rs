//! Property tests for failure classification

use proptest::prelude::*;
use winmon_core::executor::classify::{classify_script_failure, classify_transport_fault};
use winmon_core::{ErrorClass, MonitorError};

fn host_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,12}(\\.[a-z]{2,5}){0,2}"
}

/// Randomly upper-cases letters of a phrase
fn any_case(phrase: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), phrase.len()).prop_map(move |flags| {
        phrase
            .chars()
            .zip(flags)
            .map(|(c, upper)| if upper { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: stderr mentioning "Access is denied" is an auth error carrying stderr verbatim
    #[test]
    fn access_denied_is_auth(prefix in "[A-Za-z0-9 :.-]{0,30}", suffix in "[A-Za-z0-9 :.-]{0,30}") {
        let stderr = format!("{prefix}Access is denied{suffix}");
        prop_assert_eq!(classify_script_failure(&stderr), MonitorError::Auth(stderr.clone()));
    }

    /// Property: "authentication" matches in any letter case
    #[test]
    fn authentication_matches_any_case(word in any_case("authentication"), tail in "[0-9 .]{0,20}") {
        let stderr = format!("{word}{tail}");
        prop_assert_eq!(classify_script_failure(&stderr).class(), ErrorClass::Unauthorized);
    }

    /// Property: stderr without auth wording is a script error
    #[test]
    fn other_stderr_is_script_error(stderr in "[0-9 .:()_-]{1,60}") {
        prop_assert_eq!(classify_script_failure(&stderr), MonitorError::Script(stderr.clone()));
    }

    /// Property: refused connections name the target host and port
    #[test]
    fn refused_names_target(
        host in host_strategy(),
        port in 1u16..,
        refused in any_case("connection refused"),
        prefix in "[0-9 :()]{0,20}",
    ) {
        let err = classify_transport_fault(&format!("{prefix}{refused}"), &host, port);

        prop_assert_eq!(err.class(), ErrorClass::ServiceUnavailable);
        let expected_prefix = format!("Cannot reach server {host}:{port}.");
        prop_assert!(err.to_string().starts_with(&expected_prefix));
    }

    /// Property: unmatched fault text (no "4", so never "401") is wrapped as a generic connection error
    #[test]
    fn unmatched_fault_is_wrapped(host in host_strategy(), port in 1u16.., message in "[0-35-9 :()]{0,40}") {
        let err = classify_transport_fault(&message, &host, port);
        prop_assert_eq!(err, MonitorError::Connection(format!("WinRM connection error: {message}")));
    }
}
