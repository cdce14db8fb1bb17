//! Closed allow-list of keys an input spec may carry.

use once_cell::sync::Lazy;

pub const LABEL_OPTIONS: &[&str] = &[
    "model", "id", "inputId", "type", "label", "sublabel", "tooltip", "name",
];

pub const CONTAINER_OPTIONS: &[&str] = &[
    "wide",
    "multi",
    "input",
    "explain",
    "customExplain",
    "model",
    "name",
    "type",
    "autoRender",
];

pub const WRAPPER_OPTIONS: &[&str] = &[
    "model",
    "name",
    "label-top",
    "readOnly",
    "events",
    "initialize",
    "showWhen",
    "bindings",
    "render",
    "className",
    "data-se",
    "toggleWhen",
];

pub const INPUT_OPTIONS: &[&str] = &[
    "model",
    "name",
    "inputId",
    "type",
    // custom input
    "input",
    "placeholder",
    "label",
    // modes
    "readOnly",
    "read",
    "disabled",
    "readModeString",
    // select/radio
    "options",
    // model transformers
    "from",
    "to",
    "autoRender",
    "inlineValidation",
    "validateOnlyIfDirty",
    "ariaLabel",
    // widget specific
    "params",
];

pub const OTHER_OPTIONS: &[&str] = &["errorField"];

/// Ordered, de-duplicated union of every category.
pub static ALL_OPTIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut all: Vec<&'static str> = Vec::new();
    for category in OptionCategory::ALL {
        for key in category.keys() {
            if !all.contains(key) {
                all.push(key);
            }
        }
    }
    all
});

/// Where a recognized key is consumed by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionCategory {
    Label,
    Container,
    Wrapper,
    Input,
    Other,
}

impl OptionCategory {
    pub const ALL: [OptionCategory; 5] = [
        OptionCategory::Label,
        OptionCategory::Container,
        OptionCategory::Wrapper,
        OptionCategory::Input,
        OptionCategory::Other,
    ];

    pub fn keys(self) -> &'static [&'static str] {
        match self {
            OptionCategory::Label => LABEL_OPTIONS,
            OptionCategory::Container => CONTAINER_OPTIONS,
            OptionCategory::Wrapper => WRAPPER_OPTIONS,
            OptionCategory::Input => INPUT_OPTIONS,
            OptionCategory::Other => OTHER_OPTIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OptionCategory::Label => "label",
            OptionCategory::Container => "container",
            OptionCategory::Wrapper => "wrapper",
            OptionCategory::Input => "input",
            OptionCategory::Other => "other",
        }
    }

    pub fn contains(self, key: &str) -> bool {
        self.keys().contains(&key)
    }
}

pub fn is_known_option(key: &str) -> bool {
    ALL_OPTIONS.contains(&key)
}

/// Categories that pick up `key`; empty for unknown keys.
pub fn categories_of(key: &str) -> Vec<OptionCategory> {
    OptionCategory::ALL
        .into_iter()
        .filter(|category| category.contains(key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_keeps_first_occurrence_order() {
        assert_eq!(&ALL_OPTIONS[..3], &["model", "id", "inputId"]);
        let models = ALL_OPTIONS.iter().filter(|key| **key == "model").count();
        assert_eq!(models, 1);
        assert_eq!(ALL_OPTIONS.last(), Some(&"errorField"));
    }

    #[test]
    fn categories_overlap_on_shared_keys() {
        assert_eq!(
            categories_of("name"),
            vec![
                OptionCategory::Label,
                OptionCategory::Container,
                OptionCategory::Wrapper,
                OptionCategory::Input,
            ]
        );
        assert!(categories_of("title").is_empty());
        assert!(!is_known_option("inputs"));
    }
}
