pub mod clock;
pub mod identity;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use identity::{AccessTokenSlot, ClientTokenSource, ConfiguredClientToken, CurrentIdentitySource};
pub use transport::{FetchCompletion, FetchResult, GraphRequest, GraphTransport};
