//! Subscription handles

use tokio_util::sync::CancellationToken;

/// Handle to an active channel subscription.
///
/// Dropping the handle stops delivery, same as [`Subscription::unsubscribe`].
#[derive(Debug)]
pub struct Subscription {
    channel: String,
    token: CancellationToken,
}

impl Subscription {
    /// Wrap the cancellation token that stops a transport's delivery task
    pub fn new(channel: impl Into<String>, token: CancellationToken) -> Self {
        Self {
            channel: channel.into(),
            token,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// False once unsubscribed or once the owning transport disconnected
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsubscribe_cancels_token() {
        let token = CancellationToken::new();
        let subscription = Subscription::new("jobs", token.clone());

        assert!(subscription.is_active());
        assert_eq!(subscription.channel(), "jobs");

        subscription.unsubscribe();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_parent_cancellation_deactivates() {
        let parent = CancellationToken::new();
        let subscription = Subscription::new("jobs", parent.child_token());

        parent.cancel();
        assert!(!subscription.is_active());
    }
}
