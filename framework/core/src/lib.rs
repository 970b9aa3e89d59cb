mod poll;
mod text;

pub mod prelude {
    pub use crate::poll::{poll_until, PollOutcome};
    pub use crate::text::truncate;
}
