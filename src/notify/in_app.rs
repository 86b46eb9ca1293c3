//! In-app toast surface: the always-available fallback channel.
//!
//! Each toast moves `Queued -> Visible -> Dismissing -> Removed`. Time is
//! passed in by the caller, which keeps the state machine deterministic.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::notify::channel::Notification;

/// How long a toast stays visible before dismissing itself.
pub const AUTO_DISMISS: Duration = Duration::from_secs(5);
/// Length of the exit transition.
pub const EXIT_DELAY: Duration = Duration::from_millis(300);
/// Toasts rendered at once (visible or on their way out).
pub const MAX_RENDERED: usize = 5;

pub type ToastId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastState {
    Queued,
    Visible { since: Instant },
    Dismissing { since: Instant },
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: ToastId,
    pub notification: Notification,
    pub state: ToastState,
}

/// Surface shared between the router (producer) and the renderer.
pub type SharedSurface = Arc<Mutex<InAppNotificationSurface>>;

#[derive(Debug, Default)]
pub struct InAppNotificationSurface {
    toasts: VecDeque<Toast>,
    next_id: ToastId,
    blocked_banner: bool,
}

impl InAppNotificationSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSurface {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Enqueue a toast and promote it right away if a slot is free.
    pub fn push(&mut self, notification: Notification, now: Instant) -> ToastId {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push_back(Toast {
            id,
            notification,
            state: ToastState::Queued,
        });
        self.promote(now);
        id
    }

    /// Start the exit transition for a toast. Queued toasts are dropped outright.
    ///
    /// Returns `false` for unknown ids or toasts already leaving.
    pub fn dismiss(&mut self, id: ToastId, now: Instant) -> bool {
        let Some(pos) = self.toasts.iter().position(|t| t.id == id) else {
            return false;
        };
        match self.toasts[pos].state {
            ToastState::Queued => {
                self.toasts.remove(pos);
                true
            }
            ToastState::Visible { .. } => {
                self.toasts[pos].state = ToastState::Dismissing { since: now };
                true
            }
            ToastState::Dismissing { .. } => false,
        }
    }

    /// Advance timers: expire visible toasts, remove finished exits, fill freed slots.
    pub fn tick(&mut self, now: Instant) {
        for toast in self.toasts.iter_mut() {
            if let ToastState::Visible { since } = toast.state {
                if now.saturating_duration_since(since) >= AUTO_DISMISS {
                    toast.state = ToastState::Dismissing { since: now };
                }
            }
        }
        self.toasts.retain(|t| match t.state {
            ToastState::Dismissing { since } => now.saturating_duration_since(since) < EXIT_DELAY,
            _ => true,
        });
        self.promote(now);
    }

    /// Toasts currently on screen, oldest first.
    pub fn rendered(&self) -> Vec<&Toast> {
        self.toasts
            .iter()
            .filter(|t| !matches!(t.state, ToastState::Queued))
            .collect()
    }

    pub fn queued_len(&self) -> usize {
        self.toasts
            .iter()
            .filter(|t| matches!(t.state, ToastState::Queued))
            .count()
    }

    /// `None` once the toast has been removed.
    pub fn state_of(&self, id: ToastId) -> Option<ToastState> {
        self.toasts.iter().find(|t| t.id == id).map(|t| t.state)
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Persistent "notifications blocked" banner shown after a permission denial.
    pub fn set_blocked_banner(&mut self, shown: bool) {
        self.blocked_banner = shown;
    }

    pub fn blocked_banner(&self) -> bool {
        self.blocked_banner
    }

    fn promote(&mut self, now: Instant) {
        let mut free = MAX_RENDERED.saturating_sub(self.rendered_count());
        for toast in self.toasts.iter_mut() {
            if free == 0 {
                break;
            }
            if toast.state == ToastState::Queued {
                toast.state = ToastState::Visible { since: now };
                free -= 1;
            }
        }
    }

    fn rendered_count(&self) -> usize {
        self.toasts
            .iter()
            .filter(|t| !matches!(t.state, ToastState::Queued))
            .count()
    }
}
