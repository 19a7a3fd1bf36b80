//! # aira-cli — Command-Line Front End
//!
//! Provides the `aira` binary.
//!
//! ## Subcommands
//!
//! - `aira classify` — classify a flattened answers file.
//! - `aira report` — classify and export the compliance report.
//! - `aira validate` — run the step validators over an answers file.
//! - `aira system create` — register a system with the remote registry.
//! - `aira session` — drive a remote assessment session step by step.
//!
//! ```bash
//! aira classify answers.yaml
//! aira report answers.json --system-id 6f1c2b8e-1d7a-4a53-9a55-2f7c3c1d9e01 --out report.json
//! aira validate answers.json --step 5
//! aira session submit 6f1c2b8e-1d7a-4a53-9a55-2f7c3c1d9e01 --step 4 --data step4.json
//! ```
//!
//! Answer files are JSON or YAML objects keyed by field name. Output goes to
//! stdout as JSON unless `--out` names a file; a `.yaml` or `.yml` output
//! path is written as YAML.

pub mod answers;
pub mod assess;
pub mod session;

pub use answers::{load_answers, write_output};
