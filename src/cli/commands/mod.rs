pub mod migrate;
pub mod sessions;
pub mod tenants;
pub mod users;
