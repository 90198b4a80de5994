//! # Serialized text logging for bare-metal targets
//!
//! [`SinkLogger`] routes the `log` facade into any [`core::fmt::Write`]
//! sink, typically a debug UART. Every record is written in one piece under
//! a [`hal_sync`] spinlock taken with interrupts masked, so lines from
//! thread mode and interrupt handlers never interleave.
//!
//! ```
//! use hal_trace::SinkLogger;
//! use log::LevelFilter;
//!
//! static LOGGER: SinkLogger<String> = SinkLogger::new(LevelFilter::Debug, String::new());
//!
//! LOGGER.init().unwrap();
//! log::info!(target: "dma", "channel {} armed", 3);
//! assert_eq!(LOGGER.with_sink(|s| s.clone()), "[INFO] dma: channel 3 armed\n");
//! ```

#![cfg_attr(all(target_os = "none", not(any(test, doctest))), no_std)]

mod logger;

pub use logger::SinkLogger;
