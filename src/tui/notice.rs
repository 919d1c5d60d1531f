//! Transient status messages that hide themselves after a delay.

use std::time::Duration;

use log::debug;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::loader::Delivery;

pub const NOTICE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Owns the single visible notice and its hide timer.
///
/// The timer never touches UI state: it posts `Delivery::HideNotice` through
/// the loader queue and the UI loop hides the notice when it drains it.
pub struct Notifier {
    current: Option<Notice>,
    next_id: u64,
    timer: Option<JoinHandle<()>>,
    timeout: Duration,
    tx: UnboundedSender<Delivery>,
}

impl Notifier {
    pub fn new(tx: UnboundedSender<Delivery>) -> Self {
        Self::with_timeout(tx, NOTICE_TIMEOUT)
    }

    pub fn with_timeout(tx: UnboundedSender<Delivery>, timeout: Duration) -> Self {
        Self {
            current: None,
            next_id: 0,
            timer: None,
            timeout,
            tx,
        }
    }

    /// Shows `message`, replacing (and cancelling the timer of) any older notice.
    pub fn show(&mut self, level: NoticeLevel, message: impl Into<String>) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        self.next_id += 1;
        let id = self.next_id;
        let message = message.into();
        debug!("Notice {id} ({level:?}): {message}");
        self.current = Some(Notice { id, level, message });

        let tx = self.tx.clone();
        let timeout = self.timeout;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx.send(Delivery::HideNotice { id });
        }));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(NoticeLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(NoticeLevel::Success, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.show(NoticeLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(NoticeLevel::Error, message);
    }

    /// Hides notice `id` if it is still the one on screen.
    pub fn hide(&mut self, id: u64) {
        if self.current.as_ref().is_some_and(|n| n.id == id) {
            self.current = None;
            self.timer = None;
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
