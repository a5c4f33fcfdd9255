pub mod member_registry;

pub use member_registry::{MemberRegistry, MemberRegistryError};
