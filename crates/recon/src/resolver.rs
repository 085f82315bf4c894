use crate::matcher::NameMatcher;
use crate::overlay::EdgeCaseOverlay;
use crate::registry::Registry;

/// Code returned for names that cannot be resolved. Never a registry code.
pub const UNRESOLVED_CODE: &str = "XXX";

/// Colloquial name -> country code: overlay, then matcher, then registry.
///
/// Built once and shared read-only; resolution of one name never depends on
/// another, so callers may fan rows out however they like.
#[derive(Debug, Clone, Copy)]
pub struct CodeResolver<'a> {
    registry: &'a Registry,
    overlay: &'a EdgeCaseOverlay,
    matcher: NameMatcher,
}

impl<'a> CodeResolver<'a> {
    pub fn new(registry: &'a Registry, overlay: &'a EdgeCaseOverlay, matcher: NameMatcher) -> Self {
        Self {
            registry,
            overlay,
            matcher,
        }
    }

    /// Resolve one name. A matcher miss is not an error here: it yields
    /// [`UNRESOLVED_CODE`] so one aggregate row ("OECD Total") cannot abort a
    /// whole column. This is the only place a lookup failure is downgraded.
    pub fn resolve(&self, colloquial_name: &str, verbose: bool) -> &'a str {
        let substituted = self.overlay.apply(colloquial_name);
        match self.matcher.find(substituted, self.registry, verbose) {
            Ok(found) => found.record.code.as_str(),
            Err(err) => {
                if verbose {
                    log::info!(
                        "no match found for {substituted} ({err}), returning {UNRESOLVED_CODE} instead"
                    );
                }
                UNRESOLVED_CODE
            }
        }
    }

    /// Resolve a whole name column, preserving order.
    pub fn resolve_all<'n, I>(&self, names: I, verbose: bool) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'n str>,
    {
        names
            .into_iter()
            .map(|name| self.resolve(name, verbose))
            .collect()
    }
}
