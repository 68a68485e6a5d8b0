//! Change-notification hub
//!
//! One broadcast channel per scope. Watchers subscribe with an optional
//! key filter (a regular expression, matching the CLI's `watch -k`
//! behavior) and receive [`ChangeEvent`]s for every committed mutation
//! that changed an effective value.
//!
//! Delivery is at-least-once per change to each subscriber that existed
//! when the mutation committed. Events are published while the scope's
//! mutation lock is held, so a subscriber observes the events for one key
//! in commit order. A dropped subscription is pruned on the next publish;
//! a slow subscriber can lag and miss events, but never blocks the
//! publisher or other watchers.

use std::collections::HashMap;

use parking_lot::Mutex;
use regex::Regex;
use tokio::sync::broadcast;

use conf_meta::Scope;

use crate::resolver::ResolvedValue;
use crate::Result;

/// Buffered events per scope channel before slow subscribers start lagging.
const CHANNEL_CAPACITY: usize = 128;

/// A committed change to one effective value.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub scope: Scope,
    pub key: String,
    /// The freshly resolved post-change value
    pub value: ResolvedValue,
}

/// Routes change events to per-scope watcher subscriptions.
pub struct NotificationHub {
    channels: Mutex<HashMap<Scope, broadcast::Sender<ChangeEvent>>>,
}

impl NotificationHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Register a watcher for `scope`.
    ///
    /// `key_filter` restricts delivery to keys matching the regular
    /// expression; `None` delivers every change in the scope. The watcher
    /// only sees events published after this call returns.
    ///
    /// # Errors
    ///
    /// [`crate::Error::KeyFilter`] when the filter is not a valid regex.
    pub fn subscribe(&self, scope: &Scope, key_filter: Option<&str>) -> Result<Subscription> {
        let filter = key_filter.map(Regex::new).transpose()?;

        let mut channels = self.channels.lock();
        let sender = channels
            .entry(scope.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        let receiver = sender.subscribe();

        tracing::debug!(%scope, watchers = sender.receiver_count(), "watcher subscribed");
        Ok(Subscription { filter, receiver })
    }

    /// Deliver a change event to the scope's subscribers.
    ///
    /// Returns the number of subscriptions the event reached. Channels
    /// whose last subscriber has gone away are released here.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let mut channels = self.channels.lock();
        let Some(sender) = channels.get(&event.scope) else {
            return 0;
        };
        if sender.receiver_count() == 0 {
            channels.remove(&event.scope);
            return 0;
        }
        let scope = event.scope.clone();
        let key = event.key.clone();
        match sender.send(event) {
            Ok(delivered) => {
                tracing::debug!(%scope, %key, delivered, "published change");
                delivered
            }
            Err(_) => {
                // all receivers dropped between the count check and the send
                channels.remove(&scope);
                0
            }
        }
    }

    /// Number of live subscriptions for a scope.
    pub fn subscriber_count(&self, scope: &Scope) -> usize {
        self.channels
            .lock()
            .get(scope)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

/// A live watcher registration.
///
/// Dropping the subscription cancels it; the hub releases its channel on
/// the next publish once no subscribers remain.
pub struct Subscription {
    filter: Option<Regex>,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Await the next matching change event.
    ///
    /// Returns `None` once the engine (and with it the hub's sender side)
    /// has gone away. Lagged events are skipped with a warning: the watcher
    /// keeps receiving and the next `get` resolves fresh values anyway.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "watcher lagged; skipping missed events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Blocking variant of [`Subscription::recv`] for synchronous callers.
    pub fn blocking_recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.blocking_recv() {
                Ok(event) if self.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "watcher lagged; skipping missed events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll; `None` when no matching event is pending.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    fn matches(&self, event: &ChangeEvent) -> bool {
        self.filter
            .as_ref()
            .map(|re| re.is_match(&event.key))
            .unwrap_or(true)
    }
}
