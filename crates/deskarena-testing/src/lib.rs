//! Internal testing utilities shared across deskarena's crates: a fake
//! in-guest HTTP server, task fixtures, a result-directory builder, and a
//! CLI process harness. Not published for outside use.

pub mod fake_guest;
pub mod fixtures;
pub mod result_dir;
pub mod world;

pub use fake_guest::{FakeGuestServer, FakeGuestState};
pub use result_dir::TestResultRoot;
pub use world::CliWorld;
