//! # magpie-bot
//!
//! The control layer of the Magpie reply bot: the per-cycle
//! [`ReplyPipeline`] (fetch mentions, compose, post, advance the
//! watermark), the [`Supervisor`] loop that drives it with escalating
//! backoff on repeated failure, and the supporting pieces - persisted
//! state, reply text shaping, cooperative shutdown, and the health
//! snapshot.
//!
//! Everything here runs in one logical thread of control. Shared state is
//! limited to the metrics and circuit breaker `Arc`s; shutdown is a
//! cancellation flag polled between work units, never mid-call.

mod health;
mod pipeline;
mod shutdown;
mod state;
mod supervisor;
pub mod text;

pub use health::HealthReport;
pub use pipeline::ReplyPipeline;
pub use shutdown::ShutdownSignal;
pub use state::BotState;
pub use supervisor::Supervisor;
