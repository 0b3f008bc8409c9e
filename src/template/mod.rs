//! Template handling for harness definitions
//!
//! Two mechanisms let definitions share content:
//!
//! ```text
//! # YAML merge keys, deep-merged before anything else
//! kk: &kk {type: Molex KK 254, subtype: female}
//! connectors:
//!   X1: {<<: *kk, pincount: 4}
//!   X2: {<<: *kk, pincount: 2}
//!
//! # named instances of a definition inside connection sets
//! connections:
//!   - [{X1.X3: [1, 2]}, {W1: [1, 2]}, {X2: [1, 2]}]
//! ```

mod merge;
mod registry;

pub use merge::{deep_merge, merge_documents, resolve_merge_keys, MERGE_KEY};
pub use registry::TemplateRegistry;
