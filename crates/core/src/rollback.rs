//! Reverse-order release list for multi-step construction.
//!
//! Each successful allocation step pushes the action that undoes it. If a
//! later step fails, [`Rollback::unwind`] runs every pushed action, most
//! recent first; if construction completes, [`Rollback::commit`] discards
//! them. The actions receive a borrowed context (the GL API and ledger in
//! practice) rather than capturing it, so the list itself holds no borrows
//! of the device.

/// Stack of undo actions over a context `C`.
pub struct Rollback<'a, C: ?Sized> {
    actions: Vec<(&'static str, Box<dyn FnOnce(&C) + 'a>)>,
}

impl<'a, C: ?Sized> Rollback<'a, C> {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Registers the action that releases the resource just acquired.
    pub fn push(&mut self, label: &'static str, undo: impl FnOnce(&C) + 'a) {
        self.actions.push((label, Box::new(undo)));
    }

    /// Number of pending undo actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Keeps everything that was acquired and drops the undo actions.
    pub fn commit(self) {}

    /// Runs every pending action in reverse registration order.
    pub fn unwind(self, ctx: &C) {
        tracing::debug!(steps = self.len(), "unwinding partial construction");
        for (label, undo) in self.actions.into_iter().rev() {
            tracing::debug!(step = label, "rolling back");
            undo(ctx);
        }
    }
}

impl<C: ?Sized> Default for Rollback<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}
