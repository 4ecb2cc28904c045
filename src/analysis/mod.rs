//! Pure computations behind every report question and API answer.
//!
//! Nothing in here touches the database: callers hand over rows or seat
//! counts that were already fetched, and get back ordered, owned results.
//! "No result" is an empty collection or `None`, never an error.

pub mod ranking;
pub mod seat_change;
pub mod share;

pub use ranking::{rank_by, top_k, top_k_groups, Aggregate, Direction};
pub use seat_change::{compare_seats, SeatChange, SeatCount};
pub use share::percentage;
