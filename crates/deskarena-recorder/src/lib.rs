//! The trajectory recorder (C6): writes `traj.jsonl`, `traj.html`, and
//! `result.txt` into a task's result directory.

pub mod error;
pub mod npy;
pub mod traj;
pub mod value;

pub use error::{Error, Result};
pub use traj::TrajectoryWriter;
pub use value::{RecordedValue, StoredRef};
