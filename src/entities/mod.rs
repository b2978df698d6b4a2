pub mod auth_group;
pub mod auth_group_access;
pub mod auth_rule;
pub mod property;
pub mod user;

pub use auth_group::Entity as AuthGroup;
pub use auth_group_access::Entity as AuthGroupAccess;
pub use auth_rule::Entity as AuthRule;
pub use property::Entity as Property;
pub use user::Entity as User;
