// handlers/mod.rs - three-tier handler layout
//
// Public (no session) → Protected (session required) → Elevated (session + admin role)

pub mod elevated;
pub mod protected;
pub mod public;
