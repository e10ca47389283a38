use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serde::{Deserialize, Serialize};

use crate::log_debug;
use crate::timer::AlertRequest;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    /// The user has not been asked yet.
    Default,
    Granted,
    Denied,
}

/// Host-side alert surface (desktop notification, terminal bell, ...).
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    /// Asks the user for permission and returns the answer.
    fn request_permission(&self) -> Permission;

    fn show(&self, alert: &AlertRequest);
}

/// Routes alerts to a [`Notifier`], prompting for permission at most once
/// per gate.
pub struct AlertGate {
    notifier: Arc<dyn Notifier>,
    requested: AtomicBool,
}

impl AlertGate {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            requested: AtomicBool::new(false),
        }
    }

    /// Returns whether the alert was shown.
    pub fn deliver(&self, alert: &AlertRequest) -> bool {
        let permission = match self.notifier.permission() {
            Permission::Default if !self.requested.swap(true, Ordering::SeqCst) => {
                self.notifier.request_permission()
            }
            other => other,
        };

        if permission == Permission::Granted {
            self.notifier.show(alert);
            true
        } else {
            log_debug!("Dropping alert '{}': permission {:?}", alert.body, permission);
            false
        }
    }

    pub fn has_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
