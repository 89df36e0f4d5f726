//! Eureka core types
//!
//! Identifiers, monetary units and the records shared by every layer of the
//! discovery-mining ledger: mining sessions, discoveries, validators and the
//! mathematical work types that drive reward and burn tables.

pub mod address;
pub mod discovery;
pub mod session;
pub mod units;
pub mod validator;
pub mod work;

pub use address::*;
pub use discovery::*;
pub use session::*;
pub use units::*;
pub use validator::*;
pub use work::*;
