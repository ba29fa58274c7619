// cloven-vm - Channel type
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Channels: unbounded one-direction message queues.
//!
//! Built on `std::sync::mpsc`. Sends never block (the queue is unbounded);
//! receives block the calling task until a value arrives or the channel
//! closes. Values sent by one task arrive in send order; no ordering is
//! guaranteed across channels.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::value::ClovenVal;

struct ChanInner {
    // Dropped on close so blocked receivers wake with a disconnect
    tx: Mutex<Option<Sender<ClovenVal>>>,
    rx: Mutex<Receiver<ClovenVal>>,
}

/// An unbounded channel of values.
#[derive(Clone)]
pub struct Chan {
    inner: Arc<ChanInner>,
}

impl Chan {
    /// Create a new open channel.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Chan {
            inner: Arc::new(ChanInner {
                tx: Mutex::new(Some(tx)),
                rx: Mutex::new(rx),
            }),
        }
    }

    /// Send a value. Errors if the channel is closed.
    pub fn send(&self, value: ClovenVal) -> Result<()> {
        let tx = self
            .inner
            .tx
            .lock()
            .expect("channel sender mutex poisoned");
        match tx.as_ref() {
            Some(tx) => tx
                .send(value)
                .map_err(|_| Error::execution("send on closed channel")),
            None => Err(Error::execution("send on closed channel")),
        }
    }

    /// Receive the next value, blocking until one arrives.
    ///
    /// Returns `nil` once the channel is closed and drained.
    #[must_use]
    pub fn recv(&self) -> ClovenVal {
        let rx = self
            .inner
            .rx
            .lock()
            .expect("channel receiver mutex poisoned");
        rx.recv().unwrap_or(ClovenVal::Nil)
    }

    /// Close the channel. Receivers drain remaining values, then see `nil`.
    pub fn close(&self) {
        let mut tx = self
            .inner
            .tx
            .lock()
            .expect("channel sender mutex poisoned");
        *tx = None;
    }

    /// True if the channel has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner
            .tx
            .lock()
            .expect("channel sender mutex poisoned")
            .is_none()
    }

    /// Identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address for ordering.
    #[must_use]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl Default for Chan {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Chan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Chan({:p})", Arc::as_ptr(&self.inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_recv_order() {
        let ch = Chan::new();
        ch.send(ClovenVal::int(1)).unwrap();
        ch.send(ClovenVal::int(2)).unwrap();
        assert_eq!(ch.recv(), ClovenVal::int(1));
        assert_eq!(ch.recv(), ClovenVal::int(2));
    }

    #[test]
    fn test_close_drains_then_nil() {
        let ch = Chan::new();
        ch.send(ClovenVal::int(1)).unwrap();
        ch.close();
        assert!(ch.is_closed());
        assert_eq!(ch.recv(), ClovenVal::int(1));
        assert_eq!(ch.recv(), ClovenVal::Nil);
    }

    #[test]
    fn test_send_after_close_errors() {
        let ch = Chan::new();
        ch.close();
        assert!(ch.send(ClovenVal::int(1)).is_err());
    }

    #[test]
    fn test_cross_thread() {
        let ch = Chan::new();
        let sender = ch.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..10 {
                sender.send(ClovenVal::int(i)).unwrap();
            }
            sender.close();
        });
        let mut got = Vec::new();
        loop {
            match ch.recv() {
                ClovenVal::Nil => break,
                v => got.push(v),
            }
        }
        handle.join().unwrap();
        assert_eq!(got.len(), 10);
        assert_eq!(got[0], ClovenVal::int(0));
        assert_eq!(got[9], ClovenVal::int(9));
    }
}
