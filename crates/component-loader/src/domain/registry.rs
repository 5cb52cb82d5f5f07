//! Component registry: name → constructor
//!
//! Owned by one loader instance. Nothing here is process-global, so any
//! number of loaders can coexist with different registrations.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::component::{Component, ComponentArgs};
use crate::domain::data::ComponentData;
use crate::error::LoaderError;

/// Type-erased constructor.
pub type Constructor = Rc<dyn Fn(ComponentArgs) -> Box<dyn Component>>;

/// Registration entry: how to build one component type.
#[derive(Clone)]
pub struct ComponentFactory {
    constructor: Constructor,
    defaults: ComponentData,
}

impl ComponentFactory {
    /// Factory from a constructor function.
    pub fn new<C, F>(constructor: F) -> Self
    where
        C: Component,
        F: Fn(ComponentArgs) -> C + 'static,
    {
        Self {
            constructor: Rc::new(move |args| Box::new(constructor(args)) as Box<dyn Component>),
            defaults: ComponentData::new(),
        }
    }

    /// Factory from an already boxing constructor.
    pub fn boxed(constructor: impl Fn(ComponentArgs) -> Box<dyn Component> + 'static) -> Self {
        Self {
            constructor: Rc::new(constructor),
            defaults: ComponentData::new(),
        }
    }

    /// Default data, overridden by node attributes and scan data.
    #[must_use]
    pub fn with_defaults(mut self, defaults: ComponentData) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn defaults(&self) -> &ComponentData {
        &self.defaults
    }

    pub(crate) fn construct(&self, args: ComponentArgs) -> Box<dyn Component> {
        (self.constructor)(args)
    }
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

/// Known component constructors.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge entries in; an existing name is silently replaced.
    ///
    /// Returns how many entries were written.
    pub fn register<N>(&mut self, entries: impl IntoIterator<Item = (N, ComponentFactory)>) -> usize
    where
        N: Into<String>,
    {
        let mut written = 0;
        for (name, factory) in entries {
            self.factories.insert(name.into(), factory);
            written += 1;
        }
        written
    }

    /// Merge entries in, rejecting the whole batch if any name is taken.
    ///
    /// A name repeated inside the batch counts as taken. On error the
    /// registry is left exactly as it was.
    pub fn try_register<N>(
        &mut self,
        entries: impl IntoIterator<Item = (N, ComponentFactory)>,
    ) -> Result<usize, LoaderError>
    where
        N: Into<String>,
    {
        let batch: Vec<(String, ComponentFactory)> =
            entries.into_iter().map(|(name, f)| (name.into(), f)).collect();

        for (index, (name, _)) in batch.iter().enumerate() {
            let repeated = batch[..index].iter().any(|(earlier, _)| earlier == name);
            if repeated || self.factories.contains_key(name) {
                return Err(LoaderError::DuplicateComponent { name: name.clone() });
            }
        }

        Ok(self.register(batch))
    }

    /// Remove one entry; `false` if it was not registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComponentFactory> {
        self.factories.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
