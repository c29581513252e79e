pub mod investment;
pub mod policy;
pub mod session;
pub mod tenant;
pub mod user;

pub use investment::{Investment, InvestmentDetails};
pub use policy::{Policy, PolicyDetails, PolicyStatus, PolicyView};
pub use session::{SessionPayload, SessionRecord};
pub use tenant::{NewTenant, Tenant};
pub use user::{Account, AccountProfile, NewAccount, ProfileFields};
