//! Registry of peers' visual proxies.
//!
//! Each entry holds the last pose received for a peer and the proxy showing it.
//! Poses are applied as they arrive; there is no interpolation. Entries exist
//! from the moment a peer is announced, before its avatar has loaded, so
//! movement that arrives during the load is not lost.

use std::collections::BTreeMap;

use voxfire_net::ConnectionId;
use voxfire_physics::Transform;

use crate::scene::{AvatarLoadError, ProxyHandle, Scene};

/// Visual state of a remote entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    /// Avatar requested, not yet delivered.
    Loading,
    /// Avatar (or placeholder) in the scene.
    Ready(ProxyHandle),
}

/// One peer as seen by this client.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlayer {
    /// Whether the avatar has arrived in the scene yet.
    pub proxy: ProxyState,
    /// Last transform received from the relay.
    pub transform: Transform,
}

/// Connection id → remote entry. Iterates in ascending id order, which is
/// join order.
#[derive(Debug, Default)]
pub struct RemotePlayerRegistry {
    entries: BTreeMap<ConnectionId, RemotePlayer>,
}

impl RemotePlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer and request its avatar. No-op if already present.
    pub fn add<S: Scene + ?Sized>(
        &mut self,
        id: ConnectionId,
        transform: Transform,
        scene: &mut S,
    ) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(
            id,
            RemotePlayer {
                proxy: ProxyState::Loading,
                transform,
            },
        );
        scene.request_avatar(id);
        tracing::debug!("Remote player {id} added");
        true
    }

    /// Attach a finished avatar load to its entry.
    ///
    /// A failed load gets a placeholder instead. If the peer has left, or the
    /// entry already has a proxy, the delivered proxy is freed. Returns whether
    /// the proxy was adopted.
    pub fn complete_avatar_load<S: Scene + ?Sized>(
        &mut self,
        id: ConnectionId,
        result: Result<ProxyHandle, AvatarLoadError>,
        scene: &mut S,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            if let Ok(handle) = result {
                tracing::debug!("Avatar for departed player {id} discarded");
                scene.despawn(handle);
            }
            return false;
        };
        if let ProxyState::Ready(_) = entry.proxy {
            if let Ok(handle) = result {
                scene.despawn(handle);
            }
            return false;
        }

        let handle = match result {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Avatar load for {id} failed ({e}), using placeholder");
                scene.spawn_placeholder()
            }
        };
        scene.set_proxy_transform(handle, &entry.transform);
        entry.proxy = ProxyState::Ready(handle);
        true
    }

    /// Overwrite a peer's pose and snap its proxy. No-op if unknown.
    pub fn update<S: Scene + ?Sized>(
        &mut self,
        id: ConnectionId,
        transform: Transform,
        scene: &mut S,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        entry.transform = transform;
        if let ProxyState::Ready(handle) = entry.proxy {
            scene.set_proxy_transform(handle, &transform);
        }
        true
    }

    /// Forget a peer and free its proxy. Idempotent.
    pub fn remove<S: Scene + ?Sized>(&mut self, id: ConnectionId, scene: &mut S) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };
        if let ProxyState::Ready(handle) = entry.proxy {
            scene.despawn(handle);
        }
        tracing::debug!("Remote player {id} removed");
        true
    }

    /// Remove every entry.
    pub fn clear<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        for entry in std::mem::take(&mut self.entries).into_values() {
            if let ProxyState::Ready(handle) = entry.proxy {
                scene.despawn(handle);
            }
        }
    }

    pub fn get(&self, id: ConnectionId) -> Option<&RemotePlayer> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, &RemotePlayer)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::HeadlessScene;
    use glam::Vec3;

    fn pose(x: f32) -> Transform {
        Transform::new(Vec3::new(x, 2.0, 0.0), 0.0)
    }

    fn loaded(registry: &mut RemotePlayerRegistry, scene: &mut HeadlessScene) {
        for (id, result) in scene.take_pending_loads() {
            registry.complete_avatar_load(id, result, scene);
        }
    }

    #[test]
    fn test_update_before_add_is_noop() {
        let mut scene = HeadlessScene::new();
        let mut registry = RemotePlayerRegistry::new();

        assert!(!registry.update(ConnectionId(1), pose(1.0), &mut scene));
        assert!(registry.is_empty());
        assert_eq!(scene.pending_loads(), 0);
    }

    #[test]
    fn test_double_add_creates_one_entry() {
        let mut scene = HeadlessScene::new();
        let mut registry = RemotePlayerRegistry::new();

        assert!(registry.add(ConnectionId(1), pose(1.0), &mut scene));
        assert!(!registry.add(ConnectionId(1), pose(9.0), &mut scene));
        assert_eq!(registry.len(), 1);
        assert_eq!(scene.pending_loads(), 1);
        assert_eq!(registry.get(ConnectionId(1)).unwrap().transform, pose(1.0));
    }

    #[test]
    fn test_movement_during_load_is_kept() {
        let mut scene = HeadlessScene::new();
        let mut registry = RemotePlayerRegistry::new();
        registry.add(ConnectionId(1), pose(1.0), &mut scene);

        assert!(registry.update(ConnectionId(1), pose(5.0), &mut scene));
        assert_eq!(registry.get(ConnectionId(1)).unwrap().proxy, ProxyState::Loading);

        loaded(&mut registry, &mut scene);
        let entry = registry.get(ConnectionId(1)).unwrap();
        assert!(matches!(entry.proxy, ProxyState::Ready(_)));
        assert_eq!(entry.transform, pose(5.0));
    }

    #[test]
    fn test_failed_load_uses_placeholder() {
        let mut scene = HeadlessScene::new();
        scene.fail_avatar_loads = true;
        let mut registry = RemotePlayerRegistry::new();
        registry.add(ConnectionId(1), pose(1.0), &mut scene);

        loaded(&mut registry, &mut scene);
        let ProxyState::Ready(handle) = registry.get(ConnectionId(1)).unwrap().proxy else {
            panic!("placeholder should be in place");
        };
        assert!(scene.is_live(handle));
    }

    #[test]
    fn test_load_after_leave_is_freed() {
        let mut scene = HeadlessScene::new();
        let mut registry = RemotePlayerRegistry::new();
        registry.add(ConnectionId(1), pose(1.0), &mut scene);
        registry.remove(ConnectionId(1), &mut scene);

        loaded(&mut registry, &mut scene);
        assert_eq!(scene.live_count(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_completion_is_freed() {
        let mut scene = HeadlessScene::new();
        let mut registry = RemotePlayerRegistry::new();
        registry.add(ConnectionId(1), pose(1.0), &mut scene);
        loaded(&mut registry, &mut scene);

        let extra = scene.spawn_placeholder();
        assert!(!registry.complete_avatar_load(ConnectionId(1), Ok(extra), &mut scene));
        assert!(!scene.is_live(extra));
        assert_eq!(scene.live_count(), 1);
    }

    #[test]
    fn test_remove_is_idempotent_and_frees_proxy() {
        let mut scene = HeadlessScene::new();
        let mut registry = RemotePlayerRegistry::new();
        registry.add(ConnectionId(1), pose(1.0), &mut scene);
        loaded(&mut registry, &mut scene);

        assert!(registry.remove(ConnectionId(1), &mut scene));
        assert!(!registry.remove(ConnectionId(1), &mut scene));
        assert_eq!(scene.live_count(), 0);
        assert_eq!(scene.despawn_count(), 1);
    }

    #[test]
    fn test_iteration_in_join_order() {
        let mut scene = HeadlessScene::new();
        let mut registry = RemotePlayerRegistry::new();
        for id in [3, 1, 2] {
            registry.add(ConnectionId(id), pose(id as f32), &mut scene);
        }
        let ids: Vec<_> = registry.iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_clear_frees_everything() {
        let mut scene = HeadlessScene::new();
        let mut registry = RemotePlayerRegistry::new();
        registry.add(ConnectionId(1), pose(1.0), &mut scene);
        registry.add(ConnectionId(2), pose(2.0), &mut scene);
        loaded(&mut registry, &mut scene);

        registry.clear(&mut scene);
        assert!(registry.is_empty());
        assert_eq!(scene.live_count(), 0);
    }
}
