use tokio::sync::watch;

use crate::models::DivisionId;

/// The currently selected division. Only the owner can change it.
#[derive(Debug)]
pub struct Selection {
    tx: watch::Sender<Option<DivisionId>>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Selection {
    pub fn new(initial: Option<DivisionId>) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Returns true when the selection actually changed.
    pub fn select(&self, division_id: Option<DivisionId>) -> bool {
        self.tx.send_replace(division_id) != division_id
    }

    pub fn current(&self) -> Option<DivisionId> {
        *self.tx.borrow()
    }

    pub fn handle(&self) -> SelectionHandle {
        SelectionHandle { rx: self.tx.subscribe() }
    }
}

/// Read-only view of a `Selection`.
#[derive(Debug, Clone)]
pub struct SelectionHandle {
    rx: watch::Receiver<Option<DivisionId>>,
}

impl SelectionHandle {
    pub fn current(&self) -> Option<DivisionId> {
        *self.rx.borrow()
    }

    /// Wait for the next change. Returns `None` once the owner is gone.
    pub async fn changed(&mut self) -> Option<Option<DivisionId>> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}
