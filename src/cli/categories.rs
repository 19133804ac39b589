//! Command categories shown by `mach help`.

/// Display metadata for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySpec {
    pub name: &'static str,
    pub short: &'static str,
    pub long: &'static str,
    pub priority: u32,
}

/// Name of the category unavailable commands are listed under.
pub const DISABLED: &str = "disabled";

pub const CATEGORIES: &[CategorySpec] = &[
    CategorySpec {
        name: "bootstrap",
        short: "Bootstrap Commands",
        long: "Bootstrap the build system",
        priority: 90,
    },
    CategorySpec {
        name: "build",
        short: "Build Commands",
        long: "Interact with the build system",
        priority: 80,
    },
    CategorySpec {
        name: "post-build",
        short: "Post-build Commands",
        long: "Common actions performed after completing a build.",
        priority: 70,
    },
    CategorySpec {
        name: "testing",
        short: "Testing",
        long: "Run tests.",
        priority: 60,
    },
    CategorySpec {
        name: "devenv",
        short: "Development Environment",
        long: "Set up and configure your development environment.",
        priority: 50,
    },
    CategorySpec {
        name: "build-dev",
        short: "Low-level Build System Interaction",
        long: "Interact with specific parts of the build system.",
        priority: 20,
    },
    CategorySpec {
        name: "package",
        short: "Package",
        long: "Create objects to distribute",
        priority: 15,
    },
    CategorySpec {
        name: "misc",
        short: "Potpourri",
        long: "Potent potables and assorted snacks.",
        priority: 10,
    },
    CategorySpec {
        name: DISABLED,
        short: "Disabled",
        long: "The disabled commands are hidden by default. Use -v to display them. \
               These commands are unavailable for your current context, \
               run \"mach <command>\" to see why.",
        priority: 0,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = CATEGORIES.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), CATEGORIES.len());
    }

    #[test]
    fn disabled_sorts_last() {
        let lowest = CATEGORIES.iter().min_by_key(|c| c.priority).unwrap();
        assert_eq!(lowest.name, DISABLED);
    }
}
