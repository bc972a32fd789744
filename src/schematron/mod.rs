/// Rule inventory loader and bridge.
///
/// The embedded compact rule inventory is classified against a closed
/// grammar and converted into semantic constraints at validator setup.
pub mod bridge;
pub mod loader;
pub mod rules;

pub use bridge::{classification_stats, load_catalog, LoadStats};
pub use loader::{classify, ParsedRule, RuleKind};
pub use rules::{RawRule, RULES};
