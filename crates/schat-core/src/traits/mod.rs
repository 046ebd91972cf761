//! Traits (ports) implemented outside the entities

mod capabilities;
mod repositories;

pub use capabilities::{
    AllowJoinPolicy, DenyAllPermissions, JoinPolicy, NoopView, PermissionHandler,
    PermissionJoinPolicy, PrivateJoinPolicy, ViewConnector,
};
pub use repositories::{ChannelRepository, ChatterRepository, RepoResult};
