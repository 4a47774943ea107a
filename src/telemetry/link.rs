//! Link-layer abstraction for the wireless service
//!
//! The radio stack is an external collaborator. The core sees three
//! things: advertising control, notification writes, and a polled stream
//! of link events (connects, disconnects, inbound characteristic writes).

use crate::error::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Inbound link-layer events, drained by the service each loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A remote peer connected
    Connected,
    /// The remote peer dropped the connection
    Disconnected,
    /// One byte written to the control characteristic
    CommandWrite(u8),
    /// One byte written to the config characteristic
    ConfigWrite(u8),
}

/// Wireless link collaborator.
pub trait WirelessLink: Send {
    /// Begin advertising the service.
    fn start_advertising(&mut self) -> Result<()>;

    /// Stop advertising and drop any active connection.
    fn stop(&mut self) -> Result<()>;

    /// Push a data frame to the connected peer.
    fn notify_data(&mut self, frame: &[u8]) -> Result<()>;

    /// Push a peak frame to the connected peer.
    fn notify_peak(&mut self, frame: &[u8]) -> Result<()>;

    /// Next pending link event, if any.
    fn poll_event(&mut self) -> Option<LinkEvent>;
}

#[derive(Default)]
struct MockLinkInner {
    advertising: bool,
    events: VecDeque<LinkEvent>,
    data_frames: Vec<Vec<u8>>,
    peak_frames: Vec<Vec<u8>>,
}

/// In-memory link: tests and hardware-free runs inject events and inspect
/// captured frames through cloned handles.
#[derive(Clone, Default)]
pub struct MockLink {
    inner: Arc<Mutex<MockLinkInner>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next poll.
    pub fn inject_event(&self, event: LinkEvent) {
        self.inner.lock().events.push_back(event);
    }

    /// All data frames notified so far.
    pub fn data_frames(&self) -> Vec<Vec<u8>> {
        self.inner.lock().data_frames.clone()
    }

    /// All peak frames notified so far.
    pub fn peak_frames(&self) -> Vec<Vec<u8>> {
        self.inner.lock().peak_frames.clone()
    }

    pub fn is_advertising(&self) -> bool {
        self.inner.lock().advertising
    }
}

impl WirelessLink for MockLink {
    fn start_advertising(&mut self) -> Result<()> {
        self.inner.lock().advertising = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.advertising = false;
        inner.events.clear();
        Ok(())
    }

    fn notify_data(&mut self, frame: &[u8]) -> Result<()> {
        self.inner.lock().data_frames.push(frame.to_vec());
        Ok(())
    }

    fn notify_peak(&mut self, frame: &[u8]) -> Result<()> {
        self.inner.lock().peak_frames.push(frame.to_vec());
        Ok(())
    }

    fn poll_event(&mut self) -> Option<LinkEvent> {
        self.inner.lock().events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_injection_order() {
        let control = MockLink::new();
        let mut link = control.clone();
        control.inject_event(LinkEvent::Connected);
        control.inject_event(LinkEvent::CommandWrite(0x01));
        assert_eq!(link.poll_event(), Some(LinkEvent::Connected));
        assert_eq!(link.poll_event(), Some(LinkEvent::CommandWrite(0x01)));
        assert_eq!(link.poll_event(), None);
    }

    #[test]
    fn test_stop_clears_pending_events() {
        let control = MockLink::new();
        let mut link = control.clone();
        link.start_advertising().unwrap();
        control.inject_event(LinkEvent::Connected);
        link.stop().unwrap();
        assert!(!control.is_advertising());
        assert_eq!(link.poll_event(), None);
    }

    #[test]
    fn test_frame_capture() {
        let control = MockLink::new();
        let mut link = control.clone();
        link.notify_data(&[1, 2, 3]).unwrap();
        link.notify_peak(&[4, 5]).unwrap();
        assert_eq!(control.data_frames(), vec![vec![1, 2, 3]]);
        assert_eq!(control.peak_frames(), vec![vec![4, 5]]);
    }
}
