//! Property-based tests for error classification.

use alps_errors::{AlpsError, DecodeError, ErrorCategory, ErrorSeverity, IdentifyError};
use proptest::prelude::*;

fn severity_from(n: u8) -> ErrorSeverity {
    match n {
        0 => ErrorSeverity::Info,
        1 => ErrorSeverity::Warning,
        2 => ErrorSeverity::Error,
        _ => ErrorSeverity::Critical,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_error_severity_ordering(a in 0u8..=3, b in 0u8..=3) {
        prop_assert_eq!(a.cmp(&b), severity_from(a).cmp(&severity_from(b)));
    }

    #[test]
    fn test_resync_is_recoverable(index in 0usize..8, value in any::<u8>()) {
        let err: AlpsError = DecodeError::resync(index, value).into();
        prop_assert!(err.is_recoverable());
        prop_assert_eq!(err.category(), ErrorCategory::Decode);
    }

    #[test]
    fn test_resync_message_names_index(index in 0usize..8, value in any::<u8>()) {
        let msg = DecodeError::resync(index, value).to_string();
        let expected = format!("packet[{index}]");
        prop_assert!(msg.contains(&expected));
    }

    #[test]
    fn test_unsupported_signature_is_fatal(e7 in any::<[u8; 3]>(), ec in any::<[u8; 3]>()) {
        let err: AlpsError = IdentifyError::unsupported_signature(e7, ec).into();
        prop_assert!(!err.is_recoverable());
        prop_assert_eq!(err.category(), ErrorCategory::Identify);
    }

    #[test]
    fn test_unsupported_signature_message_has_bytes(e7 in any::<[u8; 3]>(), ec in any::<[u8; 3]>()) {
        let msg = IdentifyError::unsupported_signature(e7, ec).to_string();
        let e7_hex = format!("E7={:02x} {:02x} {:02x}", e7[0], e7[1], e7[2]);
        let ec_hex = format!("EC={:02x} {:02x} {:02x}", ec[0], ec[1], ec[2]);
        prop_assert!(msg.contains(&e7_hex));
        prop_assert!(msg.contains(&ec_hex));
    }
}
