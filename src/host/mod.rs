mod terminal;

pub use terminal::TerminalEvents;

use crate::error::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key
{
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Escape,
    Backspace,
    Tab,
    Char(char),
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent
{
    KeyDown
    {
        key: Key,
        ctrl: bool,
    },
    KeyUp(Key),
    Resize
    {
        cols: u16,
        rows: u16,
    },
}

impl HostEvent
{
    pub fn kind(&self) -> EventKind
    {
        match self {
            HostEvent::KeyDown { .. } => EventKind::KeyDown,
            HostEvent::KeyUp(_) => EventKind::KeyUp,
            HostEvent::Resize { .. } => EventKind::Resize,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind
{
    KeyDown,
    KeyUp,
    Resize,
}

pub trait EventSource
{
    fn poll(&mut self, timeout: Duration) -> Result<Option<HostEvent>>;
}

#[derive(Default)]
pub struct ScriptedEvents
{
    events: VecDeque<HostEvent>,
}

impl ScriptedEvents
{
    pub fn new(events: impl IntoIterator<Item = HostEvent>) -> Self
    {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool
    {
        self.events.is_empty()
    }
}

impl EventSource for ScriptedEvents
{
    fn poll(&mut self, _timeout: Duration) -> Result<Option<HostEvent>>
    {
        Ok(self.events.pop_front())
    }
}

#[derive(Default)]
struct Registry
{
    next_id: u64,
    listeners: Vec<(u64, EventKind)>,
    pending_frame: Option<u64>,
}

impl Registry
{
    fn next_id(&mut self) -> u64
    {
        self.next_id += 1;
        self.next_id
    }
}

/// Registration of interest in one kind of event. Deregisters on drop.
pub struct Listener
{
    id: u64,
    kind: EventKind,
    registry: Weak<RefCell<Registry>>,
}

impl Listener
{
    pub fn kind(&self) -> EventKind
    {
        self.kind
    }
}

impl Drop for Listener
{
    fn drop(&mut self)
    {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}

/// A pending frame callback slot. Dropping it before it fires cancels it.
pub struct FrameRequest
{
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Drop for FrameRequest
{
    fn drop(&mut self)
    {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.borrow_mut();
            if registry.pending_frame == Some(self.id) {
                registry.pending_frame = None;
            }
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Tick
{
    Event(HostEvent),
    /// The requested frame is due; milliseconds since the host started.
    Frame(f64),
    Idle,
}

pub struct Host<S: EventSource>
{
    source: S,
    registry: Rc<RefCell<Registry>>,
    frame_interval: Duration,
    started: Instant,
    next_frame_at: Instant,
}

impl<S: EventSource> Host<S>
{
    pub fn new(source: S, frame_interval: Duration) -> Self
    {
        let now = Instant::now();
        Self {
            source,
            registry: Rc::new(RefCell::new(Registry::default())),
            frame_interval,
            started: now,
            next_frame_at: now,
        }
    }

    pub fn source_mut(&mut self) -> &mut S
    {
        &mut self.source
    }

    pub fn listen(&self, kind: EventKind) -> Listener
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id();
        registry.listeners.push((id, kind));
        Listener {
            id,
            kind,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Requests a single frame. A later request replaces an earlier one that
    /// has not fired yet.
    pub fn request_animation_frame(&self) -> FrameRequest
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id();
        registry.pending_frame = Some(id);
        FrameRequest {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn listener_count(&self) -> usize
    {
        self.registry.borrow().listeners.len()
    }

    pub fn frame_pending(&self) -> bool
    {
        self.registry.borrow().pending_frame.is_some()
    }

    fn has_listener(&self, kind: EventKind) -> bool
    {
        self.registry
            .borrow()
            .listeners
            .iter()
            .any(|(_, registered)| *registered == kind)
    }

    /// Delivers listened-for events until the pending frame is due, then
    /// fires the frame. Events nobody listens to are dropped. Events that are
    /// already queued are delivered before a due frame.
    pub fn next_tick(&mut self) -> Result<Tick>
    {
        loop {
            let frame_pending = self.frame_pending();
            let timeout = if frame_pending {
                self.next_frame_at.saturating_duration_since(Instant::now())
            } else {
                self.frame_interval
            };

            if let Some(event) = self.source.poll(timeout)? {
                if self.has_listener(event.kind()) {
                    return Ok(Tick::Event(event));
                }
                log::trace!("dropping {:?} without a listener", event.kind());
                continue;
            }

            if !frame_pending {
                return Ok(Tick::Idle);
            }
            let now = Instant::now();
            if now >= self.next_frame_at {
                self.registry.borrow_mut().pending_frame = None;
                self.next_frame_at = now + self.frame_interval;
                let timestamp = now.duration_since(self.started).as_secs_f64() * 1000.0;
                return Ok(Tick::Frame(timestamp));
            }
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn host(events: Vec<HostEvent>) -> Host<ScriptedEvents>
    {
        Host::new(ScriptedEvents::new(events), Duration::from_millis(0))
    }

    #[test]
    fn test_listener_drop_deregisters()
    {
        let host = host(Vec::new());
        let keydown = host.listen(EventKind::KeyDown);
        let resize = host.listen(EventKind::Resize);
        assert_eq!(host.listener_count(), 2);
        assert_eq!(keydown.kind(), EventKind::KeyDown);

        drop(keydown);
        assert_eq!(host.listener_count(), 1);
        drop(resize);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_frame_request_cancel_on_drop()
    {
        let host = host(Vec::new());
        let request = host.request_animation_frame();
        assert!(host.frame_pending());
        drop(request);
        assert!(!host.frame_pending());
    }

    #[test]
    fn test_stale_request_does_not_cancel_newer()
    {
        let host = host(Vec::new());
        let first = host.request_animation_frame();
        let _second = host.request_animation_frame();
        drop(first);
        assert!(host.frame_pending());
    }

    #[test]
    fn test_unlistened_events_are_dropped()
    {
        let mut host = host(vec![
            HostEvent::KeyUp(Key::Space),
            HostEvent::KeyDown {
                key: Key::Char('x'),
                ctrl: false,
            },
        ]);
        let _keydown = host.listen(EventKind::KeyDown);

        assert_eq!(
            host.next_tick().unwrap(),
            Tick::Event(HostEvent::KeyDown {
                key: Key::Char('x'),
                ctrl: false
            })
        );
        assert_eq!(host.next_tick().unwrap(), Tick::Idle);
    }

    #[test]
    fn test_frame_fires_once_per_request()
    {
        let mut host = host(Vec::new());
        let _request = host.request_animation_frame();
        assert!(matches!(host.next_tick().unwrap(), Tick::Frame(_)));
        assert!(!host.frame_pending());
        assert_eq!(host.next_tick().unwrap(), Tick::Idle);
    }

    #[test]
    fn test_queued_events_before_due_frame()
    {
        let mut host = host(vec![HostEvent::Resize { cols: 10, rows: 5 }]);
        let _resize = host.listen(EventKind::Resize);
        let _request = host.request_animation_frame();

        assert_eq!(
            host.next_tick().unwrap(),
            Tick::Event(HostEvent::Resize { cols: 10, rows: 5 })
        );
        assert!(matches!(host.next_tick().unwrap(), Tick::Frame(_)));
    }
}
