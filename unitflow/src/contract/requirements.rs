//! Ordered sets of required attribute names.

use crate::context::Context;
use crate::errors::MissingAttributeError;
use indexmap::IndexSet;

/// An ordered, deduplicated set of attribute names a unit type requires
/// before its body may run.
///
/// Declaration order is load-bearing: validation reports the first
/// missing name in this order, deterministically.
#[derive(Debug, Clone, Default)]
pub struct Requirements {
    names: IndexSet<String>,
}

impl Requirements {
    /// Creates an empty requirement set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a requirement set from names, in order.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds a name, keeping the first declaration's position.
    ///
    /// Returns true if the name was not already declared.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.insert(name);
        self
    }

    /// Unions another set into this one, after the existing names.
    pub fn extend_from(&mut self, other: &Self) {
        for name in &other.names {
            self.names.insert(name.clone());
        }
    }

    /// Checks if a name is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns the declared names, in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    /// Returns the number of declared names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the first declared name whose stored value is absent or
    /// null, if any.
    ///
    /// Present-but-falsy values (empty string, zero, false) are not
    /// missing.
    #[must_use]
    pub fn first_missing(&self, ctx: &Context) -> Option<&str> {
        self.names
            .iter()
            .map(String::as_str)
            .find(|name| ctx.get(name).is_null())
    }

    /// Validates the context against this set.
    ///
    /// # Errors
    ///
    /// Returns a [`MissingAttributeError`] naming the first missing
    /// attribute in declaration order.
    pub fn validate(&self, ctx: &Context) -> Result<(), MissingAttributeError> {
        match self.first_missing(ctx) {
            Some(name) => Err(MissingAttributeError::new(name)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order_preserved() {
        let reqs = Requirements::from_names(["email", "password", "name"]);
        assert_eq!(reqs.names(), vec!["email", "password", "name"]);
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let reqs = Requirements::new()
            .require("email")
            .require("password")
            .require("email");

        assert_eq!(reqs.names(), vec!["email", "password"]);
        assert_eq!(reqs.len(), 2);
    }

    #[test]
    fn test_extend_from_appends_new_names() {
        let mut reqs = Requirements::from_names(["email", "password"]);
        reqs.extend_from(&Requirements::from_names(["password", "name"]));

        assert_eq!(reqs.names(), vec!["email", "password", "name"]);
    }

    #[test]
    fn test_first_missing_in_declaration_order() {
        let reqs = Requirements::from_names(["email", "password"]);
        let ctx = Context::new();

        assert_eq!(reqs.first_missing(&ctx), Some("email"));

        ctx.set("email", serde_json::json!("a@b.c"));
        assert_eq!(reqs.first_missing(&ctx), Some("password"));

        ctx.set("password", serde_json::json!("hunter2"));
        assert_eq!(reqs.first_missing(&ctx), None);
    }

    #[test]
    fn test_explicit_null_is_missing() {
        let reqs = Requirements::from_names(["email"]);
        let ctx = Context::new();
        ctx.set("email", serde_json::Value::Null);

        assert_eq!(reqs.first_missing(&ctx), Some("email"));
    }

    #[test]
    fn test_falsy_values_are_present() {
        let reqs = Requirements::from_names(["flag", "count", "label"]);
        let ctx = Context::new();
        ctx.set("flag", serde_json::json!(false));
        ctx.set("count", serde_json::json!(0));
        ctx.set("label", serde_json::json!(""));

        assert_eq!(reqs.first_missing(&ctx), None);
        assert!(reqs.validate(&ctx).is_ok());
    }

    #[test]
    fn test_validate_error_message() {
        let reqs = Requirements::from_names(["email", "password"]);
        let ctx = Context::new();
        ctx.set("email", serde_json::json!("a@b.c"));

        let err = reqs.validate(&ctx).unwrap_err();
        assert_eq!(err.to_string(), "Required attribute password is missing");
    }
}
