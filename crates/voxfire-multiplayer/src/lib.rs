//! Client-side multiplayer core: remote players, projectiles, lives, loadout
//! and the session that drives them.
//!
//! Nothing here owns a socket. The session consumes relay messages and
//! produces outgoing ones; a transport adapter moves them.

pub mod health;
pub mod loadout;
pub mod projectile;
pub mod remote_players;
pub mod scene;
pub mod session;
pub mod wire;


pub use health::{HitOutcome, Lives};
pub use loadout::{Loadout, Weapon};
pub use projectile::{Projectile, ProjectileOrigin, ProjectileSystem};
pub use remote_players::{ProxyState, RemotePlayer, RemotePlayerRegistry};
pub use scene::{AvatarLoadError, HeadlessScene, ProxyHandle, Scene};
pub use session::{ClientEvent, ClientSession, FrameInput};
