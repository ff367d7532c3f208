pub mod classify;
pub mod ulm;

use anyhow::Result;

use crate::classify::Category;

/// Parse the requested type keys. Unknown keys are an error; an empty list
/// is an error too since there would be nothing to compute.
pub(crate) fn parse_types(types: &[String]) -> Result<Vec<Category>> {
    if types.is_empty() {
        anyhow::bail!(
            "No classification types requested (expected any of: toxic, identity, obscene, insult)"
        );
    }
    types.iter().map(|t| t.parse()).collect()
}

pub(crate) fn default_preprocess() -> bool {
    true
}
