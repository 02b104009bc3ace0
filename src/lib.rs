//! Autonomous background producers with bounded-buffer flow control.
//!
//! A [`Producer`] runs a user-supplied generation loop on its own
//! background task and streams the output back to the host through an
//! optionally bounded FIFO buffer. Unlike a worker pool, a producer is not
//! driven by incoming work items: it generates opportunistically, and a
//! full outbound buffer throttles production (idles the loop) instead of
//! blocking it or dropping buffered values.
//!
//! The host talks to the loop through exactly two channels: control
//! messages go in via [`Producer::send`], produced values come out via
//! [`Producer::get`]. A message handler runs before production within a
//! loop iteration, so reconfigurations take effect ahead of the next value
//! and can discard buffered output that a reconfiguration made stale.
//!
//! Behavior is supplied by implementing [`Production`] (or by injecting
//! closures through [`Injected`]):
//!
//! ```
//! use spigot::{Outbound, Producer, ProducerConfig, Production, StepError};
//!
//! /// Counts upward; a control message restarts the count from its value.
//! struct Counter {
//!     i: u64,
//! }
//!
//! impl Production for Counter {
//!     type Msg = u64;
//!     type Output = u64;
//!
//!     fn handle_message(&mut self, msg: u64, outbound: &Outbound<u64>) -> Result<(), StepError> {
//!         self.i = msg;
//!         outbound.clear(); // drop values from before the reset
//!         Ok(())
//!     }
//!
//!     fn production_step(&mut self) -> Result<u64, StepError> {
//!         let next = self.i;
//!         self.i += 1;
//!         Ok(next)
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let config = ProducerConfig {
//!     buffer_size: Some(10),
//!     ..ProducerConfig::default()
//! };
//! let mut producer = Producer::with_config(Counter { i: 0 }, config).unwrap();
//! producer.start().unwrap();
//!
//! assert_eq!(producer.get().await.unwrap(), 0);
//! assert_eq!(producer.get().await.unwrap(), 1);
//!
//! producer.stop().await;
//! # });
//! ```

mod channel;
mod error;
mod inject;
mod producer;

pub use channel::Outbound;
pub use error::{ProducerError, Result, StepError};
pub use inject::Injected;
pub use producer::{Producer, ProducerConfig, Production};
