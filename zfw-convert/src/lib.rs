//! Cisco IOS zone-based firewall to Cradlepoint zone firewall conversion.
//!
//! This library turns the zone-based firewall sections parsed by
//! `ios-config-core` into the JSON export document a Cradlepoint router
//! imports: zones, filter policies, zone forwardings and the IP and port
//! identities those policies reference.
//!
//! # Architecture
//!
//! ## Building blocks
//!
//! - [`identity`] — IP and port identities for object groups and literals
//! - [`translate`] — ACL rule to filter rule translation
//! - [`consolidate`] — Merge rules that differ only in destination
//! - [`policy`] — Filter policies from standalone ACLs and policy maps
//! - [`forwarding`] — Zones, zone forwardings and the internet zone
//!
//! ## Output
//!
//! - [`schema`] — Typed export document
//! - [`emit`] — Document assembly and policy ordering
//! - [`validate`] — Structural checks over a document value
//! - [`conversion_summary`] — Object counts of a document
//!
//! ## Orchestration
//!
//! - [`engine`] — One-shot conversion session
//! - [`profile`] — Target firmware profile
//! - [`ids`] — Random or deterministic object ids
//! - [`diagnostics`] — Skipped lines and unresolved references
//! - [`inspect`] / [`report`] — Parse-only view and terminal rendering
//!
//! # Examples
//!
//! ```ignore
//! use zfw_convert::engine::{convert_file, ConvertOptions};
//!
//! let outcome = convert_file("branch.txt".as_ref(), &ConvertOptions::default())?;
//! println!("{}", serde_json::to_string_pretty(&outcome.document)?);
//! for issue in &outcome.validation {
//!     eprintln!("{}", issue.message);
//! }
//! ```

pub mod consolidate;
pub mod conversion_summary;
pub mod diagnostics;
pub mod emit;
pub mod engine;
pub mod forwarding;
pub mod identity;
pub mod ids;
pub mod inspect;
pub mod policy;
pub mod profile;
pub mod report;
pub mod schema;
pub mod translate;
pub mod validate;

pub use engine::{convert_file, convert_str, ConversionOutcome, ConvertError, ConvertOptions};
