//! Behavior kind → constructor table.

use std::collections::BTreeMap;
use std::fmt;

use crate::{BehaviorError, BehaviorKind, BehaviorResult, Controller, Domain};

type Constructor<D> = Box<dyn Fn() -> Box<dyn Controller<D>>>;

/// Populated once at startup by explicit [`register`][Self::register]
/// calls, read-only afterwards.
pub struct ControllerRegistry<D: Domain> {
    constructors: BTreeMap<D::Behavior, Constructor<D>>,
    names:        BTreeMap<&'static str, D::Behavior>,
}

impl<D: Domain> Default for ControllerRegistry<D> {
    fn default() -> Self {
        Self { constructors: BTreeMap::new(), names: BTreeMap::new() }
    }
}

impl<D: Domain> ControllerRegistry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` for `kind`.  Fails if `kind`, or another kind
    /// with the same name, is already registered.
    pub fn register<F>(&mut self, kind: D::Behavior, constructor: F) -> BehaviorResult<&mut Self>
    where
        F: Fn() -> Box<dyn Controller<D>> + 'static,
    {
        let name = kind.name();
        if self.constructors.contains_key(&kind) || self.names.contains_key(name) {
            return Err(BehaviorError::DuplicateBehavior(name.to_owned()));
        }
        self.constructors.insert(kind, Box::new(constructor));
        self.names.insert(name, kind);
        Ok(self)
    }

    /// Register a `Default`-constructible controller type for `kind`.
    pub fn register_default<T>(&mut self, kind: D::Behavior) -> BehaviorResult<&mut Self>
    where
        T: Controller<D> + Default + 'static,
    {
        self.register(kind, || Box::new(T::default()))
    }

    /// Build a fresh controller for `kind`.
    pub fn create(&self, kind: D::Behavior) -> BehaviorResult<Box<dyn Controller<D>>> {
        self.constructors
            .get(&kind)
            .map(|constructor| constructor())
            .ok_or_else(|| BehaviorError::UnknownBehavior(kind.name().to_owned()))
    }

    /// Resolve a configured name to its kind.
    pub fn kind_of(&self, name: &str) -> BehaviorResult<D::Behavior> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| BehaviorError::UnknownBehavior(name.to_owned()))
    }

    /// [`create`][Self::create] by configured name.
    pub fn create_by_name(&self, name: &str) -> BehaviorResult<(D::Behavior, Box<dyn Controller<D>>)> {
        let kind = self.kind_of(name)?;
        Ok((kind, self.create(kind)?))
    }

    pub fn contains(&self, kind: D::Behavior) -> bool {
        self.constructors.contains_key(&kind)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl<D: Domain> fmt::Debug for ControllerRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names.keys()).finish()
    }
}
