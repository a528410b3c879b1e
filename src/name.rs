//! Hierarchical symbol names.
//!
//! A [`NameHierarchy`] is an ordered list of [`NameElement`]s, outermost scope
//! first, joined by a delimiter. Its canonical key is what the identity
//! resolver deduplicates on: two hierarchies name the same symbol exactly when
//! their keys are equal.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameElement {
    pub prefix: String,
    pub name: String,
    pub postfix: String,
}

impl NameElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// An element with decoration, e.g. `("void", "run", "() const")`.
    /// `name` may be empty for anonymous or operator-like constructs.
    pub fn with_decoration(
        prefix: impl Into<String>,
        name: impl Into<String>,
        postfix: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            postfix: postfix.into(),
        }
    }

    fn write_key(&self, out: &mut String) {
        out.push_str(&self.prefix);
        out.push_str(&self.name);
        out.push_str(&self.postfix);
    }
}

impl From<&str> for NameElement {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for NameElement {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameHierarchy {
    delimiter: String,
    elements: Vec<NameElement>,
}

impl NameHierarchy {
    pub fn from_single_name(name: impl Into<String>) -> Self {
        Self::from_elements("", vec![NameElement::new(name)])
    }

    pub fn from_prefix_name_postfix(
        prefix: impl Into<String>,
        name: impl Into<String>,
        postfix: impl Into<String>,
    ) -> Self {
        Self::from_elements("", vec![NameElement::with_decoration(prefix, name, postfix)])
    }

    /// A single-element hierarchy whose children will be joined by `delimiter`.
    pub fn with_delimiter(delimiter: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_elements(delimiter, vec![NameElement::new(name)])
    }

    pub fn from_elements(delimiter: impl Into<String>, elements: Vec<NameElement>) -> Self {
        Self {
            delimiter: delimiter.into(),
            elements,
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn elements(&self) -> &[NameElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Derive a child hierarchy: this one's elements plus `element`.
    ///
    /// `self` is left untouched, so any number of siblings can be derived
    /// from the same parent.
    pub fn child(&self, element: impl Into<NameElement>) -> Self {
        self.children([element.into()])
    }

    /// Derive a descendant by appending several elements at once.
    pub fn children(&self, elements: impl IntoIterator<Item = NameElement>) -> Self {
        let mut derived = self.elements.clone();
        derived.extend(elements);
        Self {
            delimiter: self.delimiter.clone(),
            elements: derived,
        }
    }

    /// The serialized form used as the identity lookup key.
    pub fn canonical_key(&self) -> String {
        let mut key = String::new();
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                key.push_str(&self.delimiter);
            }
            element.write_key(&mut key);
        }
        key
    }
}

impl std::fmt::Display for NameHierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_key())
    }
}
