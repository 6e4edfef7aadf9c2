//! The per-type contract registry.
//!
//! Requirement declarations, composition parents and hooks are attached
//! to the concrete unit type (keyed by `TypeId`), not to instances. A
//! type's effective requirements are the union of every composition
//! parent's names (ancestors first) and its own, deduplicated. The
//! validation hook is installed at the front of the type's before-hook
//! list the first time the type declares anything, and never again.

use super::requirements::Requirements;
use crate::context::Context;
use crate::errors::UnitResult;
use crate::hooks::{AfterHook, BeforeHook};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Default)]
struct TypeContract {
    requirements: Requirements,
    parents: Vec<TypeId>,
    before: Vec<Arc<dyn BeforeHook>>,
    after: Vec<Arc<dyn AfterHook>>,
    validation_installed: bool,
}

static REGISTRY: Lazy<RwLock<HashMap<TypeId, TypeContract>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// The pre-execution hook enforcing a type's effective requirements.
///
/// Reads the registry at call time, so declarations made after
/// installation are still enforced.
struct ValidationHook {
    key: TypeId,
}

impl BeforeHook for ValidationHook {
    fn call(&self, ctx: &Context) -> UnitResult {
        effective_for(self.key).validate(ctx)?;
        Ok(())
    }
}

fn install_validation(entry: &mut TypeContract, key: TypeId) {
    if !entry.validation_installed {
        entry.before.insert(0, Arc::new(ValidationHook { key }));
        entry.validation_installed = true;
    }
}

/// Declares required attribute names for the unit type `T`.
///
/// Callable any number of times; names accumulate in declaration order
/// and duplicates are dropped. The first call installs `T`'s validation
/// hook at the front of its before-hook list.
pub fn require<T: 'static>(names: &[&str]) {
    let key = TypeId::of::<T>();
    let mut registry = REGISTRY.write();
    let entry = registry.entry(key).or_default();
    for name in names {
        entry.requirements.insert(*name);
    }
    install_validation(entry, key);
}

/// Records `Parent` as a composition parent of `Child`.
///
/// `Child`'s effective requirements become the union of `Parent`'s
/// effective names (ahead of `Child`'s own). Also installs `Child`'s
/// validation hook, so a child declaring nothing of its own still
/// validates inherited names.
pub fn inherit<Child: 'static, Parent: 'static>() {
    let key = TypeId::of::<Child>();
    let parent = TypeId::of::<Parent>();
    let mut registry = REGISTRY.write();
    let entry = registry.entry(key).or_default();
    if key != parent && !entry.parents.contains(&parent) {
        entry.parents.push(parent);
    }
    install_validation(entry, key);
}

/// Returns the effective requirements of the unit type `T`.
#[must_use]
pub fn effective_requirements<T: 'static>() -> Requirements {
    effective_for(TypeId::of::<T>())
}

pub(crate) fn effective_for(key: TypeId) -> Requirements {
    let registry = REGISTRY.read();
    let mut out = Requirements::new();
    let mut visited = HashSet::new();
    collect(key, &registry, &mut visited, &mut out);
    out
}

fn collect(
    key: TypeId,
    registry: &HashMap<TypeId, TypeContract>,
    visited: &mut HashSet<TypeId>,
    out: &mut Requirements,
) {
    // The visited set makes accidental parent cycles terminate.
    if !visited.insert(key) {
        return;
    }
    let Some(entry) = registry.get(&key) else {
        return;
    };
    for parent in &entry.parents {
        collect(*parent, registry, visited, out);
    }
    out.extend_from(&entry.requirements);
}

/// Registers a before hook for the unit type `T`, after any existing
/// hooks. The validation hook always stays in front.
pub fn register_before<T: 'static>(hook: Arc<dyn BeforeHook>) {
    let mut registry = REGISTRY.write();
    registry.entry(TypeId::of::<T>()).or_default().before.push(hook);
}

/// Registers an after hook for the unit type `T`.
pub fn register_after<T: 'static>(hook: Arc<dyn AfterHook>) {
    let mut registry = REGISTRY.write();
    registry.entry(TypeId::of::<T>()).or_default().after.push(hook);
}

#[allow(clippy::type_complexity)]
pub(crate) fn hooks_for(key: TypeId) -> (Vec<Arc<dyn BeforeHook>>, Vec<Arc<dyn AfterHook>>) {
    REGISTRY
        .read()
        .get(&key)
        .map(|entry| (entry.before.clone(), entry.after.clone()))
        .unwrap_or_default()
}

/// Returns the number of before hooks registered for `T`.
#[must_use]
pub fn before_hook_count<T: 'static>() -> usize {
    REGISTRY
        .read()
        .get(&TypeId::of::<T>())
        .map_or(0, |entry| entry.before.len())
}

/// Reads a declared attribute through the unit type `T`.
///
/// The table-driven counterpart of a per-name forwarding accessor: only
/// names in `T`'s effective requirements resolve; any other name reads
/// as `Value::Null`.
#[must_use]
pub fn required<T: 'static>(ctx: &Context, name: &str) -> serde_json::Value {
    if effective_for(TypeId::of::<T>()).contains(name) {
        ctx.get(name)
    } else {
        serde_json::Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UnitflowError;

    #[test]
    fn test_require_accumulates_and_dedupes() {
        struct Signup;

        require::<Signup>(&["email", "password"]);
        require::<Signup>(&["password", "terms"]);

        let reqs = effective_requirements::<Signup>();
        assert_eq!(reqs.names(), vec!["email", "password", "terms"]);
    }

    #[test]
    fn test_validation_hook_installed_once() {
        struct Checkout;

        require::<Checkout>(&["cart_id"]);
        require::<Checkout>(&["user_id"]);
        inherit::<Checkout, Checkout>();

        assert_eq!(before_hook_count::<Checkout>(), 1);
    }

    #[test]
    fn test_inherit_unions_parent_names_first() {
        struct Authenticate;
        struct AuthenticateAdmin;

        require::<Authenticate>(&["email", "password"]);
        require::<AuthenticateAdmin>(&["name"]);
        inherit::<AuthenticateAdmin, Authenticate>();

        let reqs = effective_requirements::<AuthenticateAdmin>();
        assert_eq!(reqs.names(), vec!["email", "password", "name"]);

        // The parent's own registry is untouched.
        let parent_reqs = effective_requirements::<Authenticate>();
        assert_eq!(parent_reqs.names(), vec!["email", "password"]);
    }

    #[test]
    fn test_inherit_without_own_names_installs_hook() {
        struct Base;
        struct Derived;

        require::<Base>(&["token"]);
        inherit::<Derived, Base>();

        assert_eq!(before_hook_count::<Derived>(), 1);
        assert_eq!(effective_requirements::<Derived>().names(), vec!["token"]);
    }

    #[test]
    fn test_inherit_chain_walks_ancestors() {
        struct Grandparent;
        struct Parent;
        struct Child;

        require::<Grandparent>(&["a"]);
        require::<Parent>(&["b"]);
        require::<Child>(&["c"]);
        inherit::<Parent, Grandparent>();
        inherit::<Child, Parent>();

        let reqs = effective_requirements::<Child>();
        assert_eq!(reqs.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parent_cycle_terminates() {
        struct Left;
        struct Right;

        require::<Left>(&["l"]);
        require::<Right>(&["r"]);
        inherit::<Left, Right>();
        inherit::<Right, Left>();

        let reqs = effective_requirements::<Left>();
        assert!(reqs.contains("l"));
        assert!(reqs.contains("r"));
    }

    #[test]
    fn test_validation_hook_reports_first_missing() {
        struct Login;

        require::<Login>(&["email", "password"]);

        let ctx = Context::new();
        let (before, _) = hooks_for(TypeId::of::<Login>());
        assert_eq!(before.len(), 1);

        let err = before[0].call(&ctx).unwrap_err();
        match err {
            UnitflowError::MissingAttribute(err) => {
                assert_eq!(err.to_string(), "Required attribute email is missing");
            }
            other => panic!("expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_hooks_stay_behind_validation() {
        struct Audited;

        register_before::<Audited>(Arc::new(|_ctx: &Context| -> UnitResult { Ok(()) }));
        require::<Audited>(&["actor"]);
        register_before::<Audited>(Arc::new(|_ctx: &Context| -> UnitResult { Ok(()) }));

        // Validation was installed at the front despite a hook existing
        // before the first declaration.
        let ctx = Context::new();
        let (before, _) = hooks_for(TypeId::of::<Audited>());
        assert_eq!(before.len(), 3);
        assert!(before[0].call(&ctx).is_err());
        assert!(before[1].call(&ctx).is_ok());
    }

    #[test]
    fn test_required_forwarding_read() {
        struct Fulfill;

        require::<Fulfill>(&["order_id"]);

        let ctx = Context::new();
        ctx.set("order_id", serde_json::json!(42));
        ctx.set("undeclared", serde_json::json!("hidden"));

        assert_eq!(required::<Fulfill>(&ctx, "order_id"), serde_json::json!(42));
        assert_eq!(
            required::<Fulfill>(&ctx, "undeclared"),
            serde_json::Value::Null
        );
    }
}
