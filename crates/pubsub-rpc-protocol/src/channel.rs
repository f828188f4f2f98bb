//! Channel naming

/// Shared request channel used when a server/client pair is not configured otherwise
pub const DEFAULT_REQUEST_CHANNEL: &str = "server_request_channel";

/// Separator between the base channel and the per-client suffix
const REPLY_SEGMENT: &str = ":resp:";

/// Build the private reply channel for one client instance.
///
/// The result has the form `{base}:resp:{suffix}`.
pub fn reply_channel_name(base: &str, suffix: &str) -> String {
    format!("{base}{REPLY_SEGMENT}{suffix}")
}

/// Check whether a channel name follows the reply channel convention
pub fn is_reply_channel(channel: &str) -> bool {
    channel
        .split_once(REPLY_SEGMENT)
        .is_some_and(|(base, suffix)| !base.is_empty() && !suffix.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_channel_name() {
        assert_eq!(
            reply_channel_name("server_request_channel", "abc"),
            "server_request_channel:resp:abc"
        );
    }

    #[test]
    fn test_is_reply_channel() {
        assert!(is_reply_channel("orders:resp:1234"));
        assert!(!is_reply_channel("orders"));
        assert!(!is_reply_channel(":resp:1234"));
        assert!(!is_reply_channel("orders:resp:"));
    }
}
