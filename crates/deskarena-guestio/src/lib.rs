//! Everything needed to talk to a running guest: the hypervisor control
//! channel (C2), the guest HTTP client (C3), action dispatch, and config
//! directive setters.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod setup;
pub mod vmctl;

pub use client::{ComputerUpdatePayload, ExecuteOutcome, GuestClient, ObsWinagent};
pub use error::{Error, Result};
pub use vmctl::{RemoteVmController, SnapshotInfo, VmController, VmStatus};
