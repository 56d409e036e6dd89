// THEORY:
// Output names must never collide: two masks called `start.png` in different
// directories still need distinct archive entries, and two WatchZones cut from
// directories with the same name still need distinct `<Name>`s.
//
// A `UniqueNamer` is one naming scope. It remembers what it has handed out, so the
// "existing names" set is always up to date. Mask files and WatchZones each get
// their own namer; the two scopes never share state.

use std::collections::HashSet;
use tracing::info;

/// Returns `base_name` if unused, else the first free `base_name_<n>` for n = 1, 2, ...
pub fn enforce_unique_name(base_name: &str, existing_names: &HashSet<String>) -> String {
    if !existing_names.contains(base_name) {
        return base_name.to_string();
    }

    let mut count = 1;
    let mut candidate = format!("{base_name}_{count}");
    while existing_names.contains(&candidate) {
        count += 1;
        candidate = format!("{base_name}_{count}");
    }
    candidate
}

/// A naming scope that records every name it allocates.
#[derive(Debug, Default, Clone)]
pub struct UniqueNamer {
    existing_names: HashSet<String>,
}

impl UniqueNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a collision-free name derived from `base_name`.
    pub fn allocate(&mut self, base_name: &str) -> String {
        let name = enforce_unique_name(base_name, &self.existing_names);
        if name != base_name {
            info!("{} relabelled as {}", base_name, name);
        }
        self.existing_names.insert(name.clone());
        name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.existing_names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.existing_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing_names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn repeated_base_names_get_numeric_suffixes() {
        let mut namer = UniqueNamer::new();
        assert_eq!(namer.allocate("boss"), "boss");
        assert_eq!(namer.allocate("boss"), "boss_1");
        assert_eq!(namer.allocate("boss"), "boss_2");
    }

    #[test]
    fn suffix_skips_names_already_taken() {
        let existing: HashSet<String> =
            ["boss", "boss_1", "boss_3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(enforce_unique_name("boss", &existing), "boss_2");
        assert_eq!(enforce_unique_name("split", &existing), "split");
    }

    #[test]
    fn literal_suffixed_name_does_not_collide_later() {
        let mut namer = UniqueNamer::new();
        assert_eq!(namer.allocate("boss_1"), "boss_1");
        assert_eq!(namer.allocate("boss"), "boss");
        assert_eq!(namer.allocate("boss"), "boss_2");
    }

    #[test]
    fn scopes_are_independent() {
        let mut masks = UniqueNamer::new();
        let mut zones = UniqueNamer::new();
        assert_eq!(masks.allocate("intro"), "intro");
        assert_eq!(zones.allocate("intro"), "intro");
        assert!(masks.contains("intro") && zones.contains("intro"));
    }

    proptest! {
        #[test]
        fn allocations_are_pairwise_distinct(
            bases in prop::collection::vec("[ab](_[12])?", 1..40),
        ) {
            let mut namer = UniqueNamer::new();
            let names: Vec<String> = bases.iter().map(|b| namer.allocate(b)).collect();
            let distinct: HashSet<&String> = names.iter().collect();
            prop_assert_eq!(distinct.len(), names.len());
            prop_assert_eq!(namer.len(), names.len());
        }
    }
}
