//! Boundary to whatever draws the world.
//!
//! The multiplayer core never renders. It asks a [`Scene`] for visual proxies
//! (player avatars, placeholder boxes, projectile spheres), moves them, and
//! frees them. [`HeadlessScene`] is a bookkeeping-only implementation used by
//! the headless client and the tests.

use std::collections::{BTreeSet, VecDeque};

use glam::Vec3;
use voxfire_net::ConnectionId;
use voxfire_physics::Transform;

/// Opaque handle to a visual owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyHandle(pub u64);

/// Why an avatar could not be produced. The registry falls back to a
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvatarLoadError {
    #[error("avatar asset unavailable: {0}")]
    AssetUnavailable(String),
}

/// Visual operations consumed by the registry and projectile subsystem.
pub trait Scene {
    /// Start loading an avatar for `id`. The result is handed back later
    /// through the session's `complete_avatar_load`.
    fn request_avatar(&mut self, id: ConnectionId);

    /// Spawn a primitive stand-in avatar, available immediately.
    fn spawn_placeholder(&mut self) -> ProxyHandle;

    /// Move an avatar proxy.
    fn set_proxy_transform(&mut self, handle: ProxyHandle, transform: &Transform);

    /// Spawn a projectile visual at `position`.
    fn spawn_projectile(&mut self, position: Vec3) -> ProxyHandle;

    /// Move a projectile visual.
    fn set_proxy_position(&mut self, handle: ProxyHandle, position: Vec3);

    /// Free a proxy. Each handle is despawned at most once.
    fn despawn(&mut self, handle: ProxyHandle);
}

/// Scene that only tracks which proxies are alive.
///
/// Avatar requests are queued and resolved by [`HeadlessScene::take_pending_loads`],
/// which the owner feeds back into the session one frame later.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    next_handle: u64,
    live: BTreeSet<ProxyHandle>,
    pending: VecDeque<ConnectionId>,
    despawned: u64,
    /// When set, every avatar load fails (exercises the placeholder path).
    pub fail_avatar_loads: bool,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ProxyHandle {
        self.next_handle += 1;
        let handle = ProxyHandle(self.next_handle);
        self.live.insert(handle);
        handle
    }

    /// Resolve every queued avatar request, in request order.
    pub fn take_pending_loads(&mut self) -> Vec<(ConnectionId, Result<ProxyHandle, AvatarLoadError>)> {
        let requests: Vec<_> = self.pending.drain(..).collect();
        requests
            .into_iter()
            .map(|id| {
                let result = if self.fail_avatar_loads {
                    Err(AvatarLoadError::AssetUnavailable(format!("avatar for {id}")))
                } else {
                    Ok(self.allocate())
                };
                (id, result)
            })
            .collect()
    }

    /// Number of proxies currently alive.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total number of despawns so far.
    pub fn despawn_count(&self) -> u64 {
        self.despawned
    }

    pub fn is_live(&self, handle: ProxyHandle) -> bool {
        self.live.contains(&handle)
    }

    /// Avatar requests not yet resolved.
    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }
}

impl Scene for HeadlessScene {
    fn request_avatar(&mut self, id: ConnectionId) {
        self.pending.push_back(id);
    }

    fn spawn_placeholder(&mut self) -> ProxyHandle {
        self.allocate()
    }

    fn set_proxy_transform(&mut self, handle: ProxyHandle, _transform: &Transform) {
        if !self.live.contains(&handle) {
            tracing::warn!("Transform set on dead proxy {handle:?}");
        }
    }

    fn spawn_projectile(&mut self, _position: Vec3) -> ProxyHandle {
        self.allocate()
    }

    fn set_proxy_position(&mut self, handle: ProxyHandle, _position: Vec3) {
        if !self.live.contains(&handle) {
            tracing::warn!("Position set on dead proxy {handle:?}");
        }
    }

    fn despawn(&mut self, handle: ProxyHandle) {
        if self.live.remove(&handle) {
            self.despawned += 1;
        } else {
            tracing::warn!("Double despawn of proxy {handle:?}");
        }
    }
}
