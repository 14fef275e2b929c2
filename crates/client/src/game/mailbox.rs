/// Holds at most one undelivered value. A newer value replaces an older
/// one that was never taken, so bursts collapse to the latest payload.
#[derive(Debug)]
pub struct Mailbox<T> {
    slot: Option<T>,
    overwritten: u64,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self {
            slot: None,
            overwritten: 0,
        }
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`. Returns true if it replaced an untaken value.
    pub fn put(&mut self, value: T) -> bool {
        let replaced = self.slot.replace(value).is_some();
        if replaced {
            self.overwritten += 1;
        }
        replaced
    }

    pub fn take(&mut self) -> Option<T> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Values dropped because a newer one arrived first.
    pub fn overwritten(&self) -> u64 {
        self.overwritten
    }
}
