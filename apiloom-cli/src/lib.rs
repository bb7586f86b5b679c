//! # Apiloom CLI
//!
//! Generates a clap command tree from an [`apiloom::Registry`] and executes
//! the endpoint behind whichever command was invoked. Results are printed as
//! indented JSON, or as raw bytes for raw-output endpoints.
//!
//! ```rust,ignore
//! let generator = CliGenerator::new(&registry, Arc::new(client));
//! let root = generator.attach(Command::new("app"));
//! let matches = root.get_matches();
//! if let Some((name, sub)) = matches.subcommand() {
//!     generator
//!         .dispatch(CallContext::new(Surface::Cli), name, sub, StdinSource::detect(), &mut stdout)
//!         .await?;
//! }
//! ```

pub mod body;
pub mod error;
pub mod exit_codes;
pub mod generator;
pub mod usage;

pub use body::{read_body, StdinSource};
pub use error::{CliError, CliResult};
pub use generator::{parse_arguments, CliGenerator};
pub use usage::use_line;
