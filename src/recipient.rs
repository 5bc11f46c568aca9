//! Permission context of the client an overload list is computed for.

use std::collections::HashSet;

use crate::error::OverloadError;

/// The capability the expander needs from a target client: a yes/no answer
/// to "does this recipient hold `permission`".
///
/// Implementations must be side-effect free. A recipient that can no longer
/// answer (disconnected, unloaded) returns [`OverloadError::InvalidRecipient`];
/// the expander propagates that error unchanged.
pub trait Recipient: Send + Sync {
    /// Name used in logs and error messages.
    fn id(&self) -> &str;

    fn has_permission(&self, permission: &str) -> Result<bool, OverloadError>;
}

/// A recipient backed by an explicit set of granted permission nodes.
#[derive(Debug, Clone)]
pub struct PermissionView {
    name: String,
    granted: HashSet<String>,
    connected: bool,
}

impl PermissionView {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            granted: HashSet::new(),
            connected: true,
        }
    }

    pub fn grant(mut self, permission: impl Into<String>) -> Self {
        self.granted.insert(permission.into());
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.granted.extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Mark the recipient as gone. Every later permission query fails.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }
}

impl Recipient for PermissionView {
    fn id(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> Result<bool, OverloadError> {
        if !self.connected {
            return Err(OverloadError::InvalidRecipient {
                recipient: self.name.clone(),
                reason: "recipient is disconnected".to_string(),
            });
        }
        Ok(self.granted.contains(permission))
    }
}
