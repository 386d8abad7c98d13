//! Podforge — two-host podcast generation pipeline.
//!
//! Turns written content into a spoken podcast episode: a script is
//! parsed or synthesized into speaker-attributed segments, each segment
//! is voiced through a text-to-speech provider, and the results are
//! stitched into one audio artifact. The whole flow is tracked through a
//! persisted job record with forward-only status transitions.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use podforge::prelude::*;
//!
//! # async fn example() -> podforge::error::Result<()> {
//! let config = PodforgeConfig::from_env();
//! let api_key = config.get_api_key("openai").unwrap_or_default();
//!
//! let orchestrator = PodcastOrchestrator::new(
//!     Arc::new(InMemoryJobStore::new()),
//!     Arc::new(OpenAiCompletionProvider::new(api_key.clone())),
//!     Arc::new(OpenAiSpeechProvider::new(api_key)),
//!     Arc::new(LocalArtifactStore::new("./artifacts")),
//! );
//!
//! let job = orchestrator
//!     .generate_script("user-1", "Rust 1.75 stabilized async fn in traits.", None, PodcastOptions::default())
//!     .await?;
//! println!("job {} is {}", job.id, job.status);
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod job;
pub mod prelude;
pub mod provider;
pub mod script;
pub mod util;
