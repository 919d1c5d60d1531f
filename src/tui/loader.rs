//! Background fetches and their hand-off to the UI loop.
//!
//! Every fetch runs on its own tokio task and reports back through a single
//! unbounded queue that the UI drains once per tick. Each request is stamped
//! with a per-page generation; only a delivery carrying the latest
//! generation for its page is ever accepted.

use std::collections::HashMap;
use std::future::Future;

use log::{debug, warn};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::cascade::CascadeReport;
use crate::error::Result;

use super::navigator::PageId;
use super::page::Payload;

/// Identity of one fetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub page: PageId,
    pub generation: u64,
}

#[derive(Debug)]
pub enum Delivery {
    Loaded {
        ticket: Ticket,
        result: Result<Payload>,
    },
    /// Diagnostics bound to the pipelines load that triggered them.
    Cascade {
        ticket: Ticket,
        report: CascadeReport,
    },
    HideNotice {
        id: u64,
    },
}

pub struct Loader {
    generations: HashMap<PageId, u64>,
    tx: UnboundedSender<Delivery>,
    rx: UnboundedReceiver<Delivery>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            generations: HashMap::new(),
            tx,
            rx,
        }
    }

    /// Sender for other producers of UI events, such as notice timers.
    pub fn sender(&self) -> UnboundedSender<Delivery> {
        self.tx.clone()
    }

    /// Supersedes whatever is in flight for `page` and returns the new ticket.
    pub fn begin(&mut self, page: PageId) -> Ticket {
        let generation = self.generations.entry(page).or_insert(0);
        *generation += 1;
        Ticket {
            page,
            generation: *generation,
        }
    }

    /// Starts `fetch` for `page` on a background task. An older request for
    /// the same page keeps running but its result will be dropped.
    pub fn load<F>(&mut self, page: PageId, fetch: F) -> Ticket
    where
        F: Future<Output = Result<Payload>> + Send + 'static,
    {
        let ticket = self.begin(page);
        debug!("Loading {page} (generation {})", ticket.generation);

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fetch.await;
            if tx.send(Delivery::Loaded { ticket, result }).is_err() {
                debug!("Delivery queue closed, dropping result for {}", ticket.page);
            }
        });
        ticket
    }

    /// Runs a cascade on a background task under an existing load's ticket.
    pub fn follow_up<F>(&self, ticket: Ticket, work: F)
    where
        F: Future<Output = CascadeReport> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let report = work.await;
            if tx.send(Delivery::Cascade { ticket, report }).is_err() {
                debug!("Delivery queue closed, dropping cascade for {}", ticket.page);
            }
        });
    }

    /// Invalidates anything in flight for `page`, e.g. when the page is removed.
    pub fn cancel(&mut self, page: PageId) {
        if let Some(generation) = self.generations.get_mut(&page) {
            *generation += 1;
            debug!("Cancelled pending loads for {page}");
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generations.get(&ticket.page) == Some(&ticket.generation)
    }

    /// Passes through deliveries for the latest request of their page and
    /// drops everything older.
    pub fn accept(&self, delivery: Delivery) -> Option<Delivery> {
        let ticket = match &delivery {
            Delivery::Loaded { ticket, .. } | Delivery::Cascade { ticket, .. } => *ticket,
            Delivery::HideNotice { .. } => return Some(delivery),
        };

        if self.is_current(ticket) {
            Some(delivery)
        } else {
            debug!(
                "Dropping stale delivery for {} (generation {})",
                ticket.page, ticket.generation
            );
            None
        }
    }

    /// Non-blocking drain used by the UI tick. Stale deliveries are filtered.
    pub fn try_next(&mut self) -> Option<Delivery> {
        loop {
            match self.rx.try_recv() {
                Ok(delivery) => {
                    if let Some(delivery) = self.accept(delivery) {
                        return Some(delivery);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    warn!("Delivery queue disconnected");
                    return None;
                }
            }
        }
    }

    /// Waits for the next raw delivery, stale or not.
    #[cfg(test)]
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }
}
