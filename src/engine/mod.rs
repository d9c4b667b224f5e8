//! The exam session engine.
//!
//! Pure pieces (`draw`, `grader`, `score`, `stats`) are synchronous and
//! storage-free. `review`, `learn` and [`ExamEngine`] read and write through
//! the traits in [`crate::store`].

pub mod draw;
pub mod grader;
pub mod learn;
pub mod review;
pub mod score;
pub mod session;
pub mod stats;

pub use session::{ExamEngine, ExamSettings, StartedExam};
