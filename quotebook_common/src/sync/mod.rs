//! Reconciliation of the local collection with a remote endpoint.
//!
//! - `remote`: wire types and the `RemoteClient` seam (with an HTTP implementation).
//! - `scheduler`: cancellable fixed-interval background tasks.
//! - `service`: merge/push operations and the `SyncService` running both on timers.
pub mod remote;
pub mod scheduler;
pub mod service;

pub use remote::{HttpRemote, NewPost, RemoteClient, RemotePost};
pub use scheduler::ScheduledTask;
pub use service::{PushReport, SharedStore, SyncEvent, SyncService};
