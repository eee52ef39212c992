pub mod auth;
pub mod connectivity;
pub mod scheduler;
pub mod synchronizer;

#[cfg(test)]
mod test_support;

pub use auth::AuthService;
pub use connectivity::ConnectivityMonitor;
pub use scheduler::{ScheduleConfig, SyncScheduler};
pub use synchronizer::{FAILURE_MESSAGE, MessageSynchronizer, PollOutcome, PollSkip, SendOutcome};
