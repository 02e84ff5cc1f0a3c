//! Infrastructure adapters for verifyflow ports.

pub mod delivery;
pub mod documents;
pub mod progress;
pub mod time;

pub use delivery::LogOtpDelivery;
pub use documents::InMemoryDocumentRepository;
pub use progress::{FileProgressStore, InMemoryProgressStore};
pub use time::{SystemClock, Timer};
