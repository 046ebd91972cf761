//! Test fixtures
//!
//! Message targets and capabilities that record what the core did to them.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use schat_core::entities::{Delivery, Message, MessageTarget};
use schat_core::traits::PermissionHandler;
use schat_core::value_objects::TargetId;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A unique chatter or channel name with the given prefix
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}{}", unique_suffix())
}

/// A custom target that records every message it receives
pub struct RecordingTarget {
    name: String,
    received: Mutex<Vec<Message>>,
}

impl RecordingTarget {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            received: Mutex::new(Vec::new()),
        })
    }

    /// Received messages, oldest first
    pub fn received(&self) -> Vec<Message> {
        self.received.lock().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.received.lock().iter().map(|m| m.text().to_string()).collect()
    }

    pub fn count(&self) -> usize {
        self.received.lock().len()
    }
}

impl MessageTarget for RecordingTarget {
    fn target_id(&self) -> TargetId {
        TargetId::Custom(self.name.clone())
    }

    fn deliver(&self, message: &Message, _delivery: &mut Delivery) {
        self.received.lock().push(message.clone());
    }
}

/// Permissions that can be granted while a test runs
#[derive(Default)]
pub struct GrantablePermissions {
    granted: RwLock<HashSet<String>>,
}

impl GrantablePermissions {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn grant(&self, permission: impl Into<String>) {
        self.granted.write().insert(permission.into());
    }

    pub fn revoke(&self, permission: &str) {
        self.granted.write().remove(permission);
    }
}

impl PermissionHandler for GrantablePermissions {
    fn has_permission(&self, permission: &str) -> bool {
        self.granted.read().contains(permission)
    }
}
