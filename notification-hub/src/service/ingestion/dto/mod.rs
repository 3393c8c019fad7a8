mod acknowledgment;
mod delivery_outcome;
mod transport_status;

pub use acknowledgment::*;
pub use delivery_outcome::*;
pub use transport_status::*;
