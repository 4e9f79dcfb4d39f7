//! Frame-driven animation loop.
//!
//! The host owns the redraw signal: it calls [`AnimationDriver::frame`] once per display refresh
//! (or hands a [`FrameSource`] to [`AnimationDriver::run`]). Each frame advances the simulation by
//! exactly one tick and publishes a fresh [`Snapshot`] to every subscriber.
//!
//! A session is created by [`AnimationDriver::start`] and ends for good when its handle is
//! cancelled. There is no pause: restarting always reseeds the layout from the spiral placement.

use crate::config::LayoutConfig;
use crate::edges::{self, Edge};
use crate::error::Result;
use crate::force::ForceSimulator;
use crate::node::NodeSet;
use crate::snapshot::Snapshot;
use crate::state::SimulationState;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

type Subscriber = Box<dyn FnMut(&Arc<Snapshot>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    /// Nothing has been started yet.
    Idle,
    Running,
    /// The last session was cancelled (terminal for its handle).
    Cancelled,
}

/// Handle to one animation session.
///
/// Clones share the cancellation flag, so any holder (a renderer teardown hook, a subscriber
/// closure) can end the session without access to the driver.
#[derive(Debug, Clone)]
pub struct AnimationHandle {
    id: u64,
    cancelled: Rc<Cell<bool>>,
}

impl AnimationHandle {
    fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Rc::new(Cell::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl PartialEq for AnimationHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AnimationHandle {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Source of frame opportunities, typically the host's redraw callback.
pub trait FrameSource {
    /// Returns the next frame number, or `None` once the host stops offering frames.
    fn next_frame(&mut self) -> Option<u64>;
}

/// Offers a fixed number of frames.
#[derive(Debug, Clone)]
pub struct FixedFrames {
    next: u64,
    remaining: usize,
}

impl FixedFrames {
    pub fn new(count: usize) -> Self {
        Self {
            next: 0,
            remaining: count,
        }
    }
}

impl FrameSource for FixedFrames {
    fn next_frame(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let frame = self.next;
        self.next += 1;
        Some(frame)
    }
}

struct Session {
    handle: AnimationHandle,
    nodes: NodeSet,
    fingerprint: u64,
    edges: Arc<[Edge]>,
    state: SimulationState,
    tick: u64,
}

pub struct AnimationDriver {
    config: LayoutConfig,
    simulator: ForceSimulator,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    session: Option<Session>,
    latest: Option<Arc<Snapshot>>,
    started_any: bool,
    next_handle_id: u64,
    next_subscription_id: u64,
}

impl AnimationDriver {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let simulator = ForceSimulator::new(&config);
        Ok(Self {
            config,
            simulator,
            subscribers: Vec::new(),
            session: None,
            latest: None,
            started_any: false,
            next_handle_id: 0,
            next_subscription_id: 0,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&Arc<Snapshot>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Starts a new session for `nodes`, cancelling any running one.
    ///
    /// The layout is always reseeded from the spiral placement; nothing carries over from a
    /// previous session.
    pub fn start(&mut self, nodes: NodeSet) -> AnimationHandle {
        self.teardown();

        let handle = AnimationHandle::new(self.next_handle_id);
        self.next_handle_id += 1;

        let state = SimulationState::seed(&nodes, &self.config);
        let edges: Arc<[Edge]> = edges::resolve(&nodes).into();
        tracing::debug!(
            session = handle.id,
            nodes = nodes.len(),
            edges = edges.len(),
            "layout session started"
        );

        self.session = Some(Session {
            handle: handle.clone(),
            fingerprint: nodes.fingerprint(),
            nodes,
            edges,
            state,
            tick: 0,
        });
        self.started_any = true;
        handle
    }

    /// Keeps the running session when `nodes` has the same ids and kinds in the same order,
    /// otherwise restarts from scratch.
    pub fn sync(&mut self, nodes: NodeSet) -> AnimationHandle {
        let fingerprint = nodes.fingerprint();
        if let Some(session) = self.session.as_mut() {
            // The fingerprint only rules sets out; equal hashes are confirmed element-wise.
            if !session.handle.is_cancelled()
                && session.fingerprint == fingerprint
                && session.nodes.same_layout_keys(&nodes)
            {
                // Labels, status and payload may still differ.
                session.nodes = nodes;
                return session.handle.clone();
            }
        }
        tracing::debug!(nodes = nodes.len(), "node set changed, resetting layout");
        self.start(nodes)
    }

    /// Ends the session behind `handle`. Safe to call any number of times, with any handle.
    pub fn cancel(&mut self, handle: &AnimationHandle) {
        handle.cancel();
        let is_current = self
            .session
            .as_ref()
            .is_some_and(|s| s.handle == *handle);
        if is_current {
            self.teardown();
        }
    }

    pub fn status(&self) -> DriverStatus {
        match &self.session {
            Some(s) if !s.handle.is_cancelled() => DriverStatus::Running,
            _ if self.started_any => DriverStatus::Cancelled,
            _ => DriverStatus::Idle,
        }
    }

    pub fn status_of(&self, handle: &AnimationHandle) -> DriverStatus {
        match &self.session {
            Some(s) if s.handle == *handle && !handle.is_cancelled() => DriverStatus::Running,
            _ => DriverStatus::Cancelled,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status() == DriverStatus::Running
    }

    /// Last published snapshot of the current session.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.latest.clone()
    }

    /// Captures the current state without ticking or publishing.
    pub fn preview(&self) -> Option<Snapshot> {
        let s = self.session.as_ref().filter(|s| !s.handle.is_cancelled())?;
        Some(Snapshot::capture(
            s.tick,
            &s.nodes,
            &s.state,
            Arc::clone(&s.edges),
        ))
    }

    pub fn state(&self) -> Option<&SimulationState> {
        self.session
            .as_ref()
            .filter(|s| !s.handle.is_cancelled())
            .map(|s| &s.state)
    }

    /// Runs one tick and publishes the result. Returns `None` when no session is running.
    pub fn frame(&mut self) -> Option<Arc<Snapshot>> {
        let cancelled = self.session.as_ref()?.handle.is_cancelled();
        if cancelled {
            self.teardown();
            return None;
        }

        let stepped = {
            let session = self.session.as_mut()?;
            self.simulator.step(&mut session.state, &session.nodes)
        };
        if let Err(err) = stepped {
            tracing::error!(%err, "layout session aborted");
            self.teardown();
            return None;
        }

        let (handle, snapshot) = {
            let session = self.session.as_mut()?;
            session.tick += 1;
            let snapshot = Arc::new(Snapshot::capture(
                session.tick,
                &session.nodes,
                &session.state,
                Arc::clone(&session.edges),
            ));
            (session.handle.clone(), snapshot)
        };
        tracing::trace!(session = handle.id, tick = snapshot.tick, "frame");

        for (_, subscriber) in self.subscribers.iter_mut() {
            if handle.is_cancelled() {
                break;
            }
            subscriber(&snapshot);
        }

        self.latest = Some(Arc::clone(&snapshot));
        if handle.is_cancelled() {
            self.teardown();
        }
        Some(snapshot)
    }

    /// Pulls frames from `frames` until it runs dry or the session ends. Returns the number of
    /// ticks run.
    pub fn run(&mut self, frames: &mut impl FrameSource) -> usize {
        let mut ticks = 0;
        while self.is_running() {
            if frames.next_frame().is_none() {
                break;
            }
            if self.frame().is_some() {
                ticks += 1;
            }
        }
        ticks
    }

    fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            session.handle.cancel();
            tracing::debug!(
                session = session.handle.id,
                ticks = session.tick,
                "layout session cancelled"
            );
        }
        self.latest = None;
    }
}

impl Drop for AnimationDriver {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn nodes() -> NodeSet {
        NodeSet::new(vec![
            Node::stat("clips", "Clips"),
            Node::project("p1", "Trailer").with_status("active"),
            Node::action("upload", "Upload"),
        ])
        .unwrap()
    }

    #[test]
    fn status_walks_idle_running_cancelled() {
        let mut driver = AnimationDriver::new(LayoutConfig::default()).unwrap();
        assert_eq!(driver.status(), DriverStatus::Idle);
        assert!(driver.frame().is_none());

        let handle = driver.start(nodes());
        assert_eq!(driver.status(), DriverStatus::Running);
        assert_eq!(driver.status_of(&handle), DriverStatus::Running);

        driver.cancel(&handle);
        assert_eq!(driver.status(), DriverStatus::Cancelled);
        assert_eq!(driver.status_of(&handle), DriverStatus::Cancelled);
    }

    #[test]
    fn restart_cancels_previous_handle() {
        let mut driver = AnimationDriver::new(LayoutConfig::default()).unwrap();
        let first = driver.start(nodes());
        let second = driver.start(nodes());
        assert!(first.is_cancelled());
        assert_ne!(first, second);
        assert_eq!(driver.status_of(&first), DriverStatus::Cancelled);
        assert_eq!(driver.status_of(&second), DriverStatus::Running);

        // Cancelling a stale handle leaves the new session alone.
        driver.cancel(&first);
        assert!(driver.is_running());
    }

    #[test]
    fn ticks_are_numbered_from_one() {
        let mut driver = AnimationDriver::new(LayoutConfig::default()).unwrap();
        driver.start(nodes());
        assert_eq!(driver.preview().unwrap().tick, 0);
        assert_eq!(driver.frame().unwrap().tick, 1);
        assert_eq!(driver.frame().unwrap().tick, 2);
        assert_eq!(driver.latest().unwrap().tick, 2);
    }

    #[test]
    fn dropping_the_driver_cancels_outstanding_handles() {
        let mut driver = AnimationDriver::new(LayoutConfig::default()).unwrap();
        let handle = driver.start(nodes());
        drop(driver);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = LayoutConfig::default();
        config.forces.min_distance = 0.0;
        assert!(AnimationDriver::new(config).is_err());
    }
}
