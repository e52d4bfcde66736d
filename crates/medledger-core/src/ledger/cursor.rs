use crate::ledger::{LedgerCursor, LedgerError};
use tracing::warn;

///
/// ScopedCursor
///
/// Owns a ledger cursor for the duration of one query.
///
/// - `finish` closes the cursor and surfaces the close error.
/// - Dropping an unfinished cursor (early return, `?`, unwind) closes it
///   best-effort and logs a close failure instead of propagating it.
///

pub struct ScopedCursor<C: LedgerCursor> {
    cursor: C,
    label: &'static str,
    closed: bool,
}

impl<C: LedgerCursor> ScopedCursor<C> {
    pub const fn new(cursor: C, label: &'static str) -> Self {
        Self {
            cursor,
            label,
            closed: false,
        }
    }

    pub fn next_entry(&mut self) -> Result<Option<C::Item>, LedgerError> {
        if self.closed {
            return Err(LedgerError::Cursor {
                label: self.label,
                reason: "read after close".to_string(),
            });
        }

        self.cursor.next_entry()
    }

    /// Close the cursor on the success path.
    pub fn finish(mut self) -> Result<(), LedgerError> {
        self.closed = true;
        self.cursor.close()
    }
}

impl<C: LedgerCursor> Drop for ScopedCursor<C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        self.closed = true;
        if let Err(err) = self.cursor.close() {
            warn!(cursor = self.label, error = %err, "cursor close failed during unwind");
        }
    }
}
