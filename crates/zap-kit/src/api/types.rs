/// Unique identifier for a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Identifier of a field registered with a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub usize);

/// Identifier of a body follower registered with a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FollowerId(pub usize);
