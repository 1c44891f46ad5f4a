//! # zettelflow pipeline
//!
//! Stage drivers that move text through the three zettelflow directories.
//!
//! ## Architecture
//!
//! Each stage reads from one directory and writes into the next:
//!
//! 1. **Ingest** ([`IngestDriver`]): a file, a directory or stdin is sent
//!    through the ingest prompt; the streamed answer becomes
//!    `ingest_<timestamp>.txt`
//! 2. **Split** ([`SplitDriver`]): every ingest file is cut on the delimiter,
//!    each chunk rendered through the note template, and the source moved to
//!    `processed`
//! 3. **Enrich** ([`EnrichDriver`]): every split note gets a metadata block
//!    from the model while its body is carried over unchanged
//!
//! Drivers take the configuration and the completion provider in their
//! constructors; nothing is read from global state. A run returns a
//! [`RunReport`]; per-file failures either stop the run or are recorded,
//! depending on `pipeline.halt_on_error`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zettelflow_pipeline::{EnrichDriver, SplitDriver};
//!
//! let report = SplitDriver::new(&config)?.run()?;
//! println!("{} note(s) written", report.outputs.len());
//!
//! let enrich = EnrichDriver::new(&config, provider)?;
//! let report = enrich.run().await?;
//! ```

#![warn(clippy::all)]

pub mod enrich;
pub mod ingest;
pub mod input;
pub mod report;
pub mod split;

pub use enrich::{EnrichDriver, EnrichOutcome};
pub use ingest::IngestDriver;
pub use input::{InputSource, InputUnit, STDIN_LABEL};
pub use report::{ErrorPolicy, FileFailure, RunReport};
pub use split::{RenderedNote, SplitDriver};
