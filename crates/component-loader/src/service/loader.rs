//! Component Loader Service
//!
//! Reconciles the node tree against the live instance table.
//!
//! ## Instance state machine
//!
//! ```text
//! absent ──scan finds key──▶ live ──scan misses key──▶ absent
//! ```
//!
//! There is no other state. A key passes through a short `Constructing` or
//! `Destroying` transition while user code runs, which only exists to keep
//! re-entrant scans from constructing or destroying the same key twice.
//!
//! A key whose handler is still inside one of its own hooks when a nested
//! scan misses it stays `Destroying` and live until that hook returns; the
//! `destroy` hook then runs and the entry is removed.

use serde_json::Value;
use shared_bus::{Callback, TopicTable};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::component::{ComponentArgs, Hooks};
use crate::domain::{
    attribute_data, merge_layers, ComponentData, ComponentFactory, ComponentRegistry, Deferred,
    DeferredQueue, IdentityIssuer, InstanceHandle, InstanceKey, LiveInstanceTable, LoaderConfig,
    NodeHandle, NodeId, ScanReport,
};
use crate::error::LoaderError;
use crate::invocation::MethodPath;
use crate::metrics::{LoaderMetrics, MetricsSnapshot};
use crate::ports::{MediatorApi, NodeTree, Subscriber};
use crate::service::Mediator;

/// Transient state of a key while user code runs for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Constructing,
    Destroying,
}

/// Resets the notification flag even if a render hook unwinds.
struct NotifyGuard<'a>(&'a Cell<bool>);

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Shared loader state. Every table is borrowed only for the duration of a
/// lookup or update, never across a call into component code.
pub(crate) struct LoaderCore {
    tree: Rc<dyn NodeTree>,
    context: NodeHandle,
    config: LoaderConfig,
    registry: RefCell<ComponentRegistry>,
    instances: RefCell<LiveInstanceTable>,
    transitions: RefCell<HashMap<InstanceKey, Transition>>,
    topics: TopicTable<Subscriber>,
    identities: RefCell<IdentityIssuer>,
    pending_renders: RefCell<Vec<InstanceKey>>,
    notifying: Cell<bool>,
    deferred: RefCell<DeferredQueue>,
    metrics: LoaderMetrics,
    this: Weak<LoaderCore>,
}

/// Lifecycle manager for declaratively marked components.
///
/// Cloning is cheap and yields another handle to the same loader.
#[derive(Clone)]
pub struct ComponentLoader {
    core: Rc<LoaderCore>,
}

impl ComponentLoader {
    /// Loader scanning the whole tree with the default configuration.
    pub fn new<T: NodeTree + 'static>(tree: Rc<T>) -> Self {
        let context = tree.root();
        Self::build(tree, context, LoaderConfig::default(), IdentityIssuer::new())
    }

    /// Loader scanning only below `context`.
    pub fn with_context<T: NodeTree + 'static>(tree: Rc<T>, context: NodeHandle) -> Self {
        Self::build(tree, context, LoaderConfig::default(), IdentityIssuer::new())
    }

    /// Loader with a custom configuration.
    ///
    /// # Errors
    ///
    /// `LoaderError::InvalidConfig` if `config` fails validation.
    pub fn with_config<T: NodeTree + 'static>(
        tree: Rc<T>,
        context: NodeHandle,
        config: LoaderConfig,
    ) -> Result<Self, LoaderError> {
        config.validate()?;
        Ok(Self::build(tree, context, config, IdentityIssuer::new()))
    }

    /// Loader drawing node identities from a custom issuer.
    pub fn with_identities<T: NodeTree + 'static>(tree: Rc<T>, identities: IdentityIssuer) -> Self {
        let context = tree.root();
        Self::build(tree, context, LoaderConfig::default(), identities)
    }

    fn build(
        tree: Rc<dyn NodeTree>,
        context: NodeHandle,
        config: LoaderConfig,
        identities: IdentityIssuer,
    ) -> Self {
        let core = Rc::new_cyclic(|this| LoaderCore {
            tree,
            context,
            config,
            registry: RefCell::new(ComponentRegistry::new()),
            instances: RefCell::new(LiveInstanceTable::new()),
            transitions: RefCell::new(HashMap::new()),
            topics: TopicTable::new(),
            identities: RefCell::new(identities),
            pending_renders: RefCell::new(Vec::new()),
            notifying: Cell::new(false),
            deferred: RefCell::new(DeferredQueue::new()),
            metrics: LoaderMetrics::new(),
            this: this.clone(),
        });
        debug!(context = %context, "Component loader created");
        Self { core }
    }

    pub(crate) fn from_core(core: Rc<LoaderCore>) -> Self {
        Self { core }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Merge constructors into the registry, replacing names already taken.
    ///
    /// Live instances of a replaced name keep running; only new instances use
    /// the new constructor.
    pub fn register<N>(&self, components: impl IntoIterator<Item = (N, ComponentFactory)>) -> usize
    where
        N: Into<String>,
    {
        let written = self.core.registry.borrow_mut().register(components);
        debug!(written, "Components registered");
        written
    }

    /// Merge constructors in, rejecting the whole batch on any taken name.
    ///
    /// # Errors
    ///
    /// `LoaderError::DuplicateComponent` naming the first taken name.
    pub fn try_register<N>(
        &self,
        components: impl IntoIterator<Item = (N, ComponentFactory)>,
    ) -> Result<usize, LoaderError>
    where
        N: Into<String>,
    {
        self.core.registry.borrow_mut().try_register(components)
    }

    /// Remove a constructor. Already-live instances are not affected.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.core.registry.borrow_mut().unregister(name);
        debug!(name, removed, "Component unregistered");
        removed
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.core.registry.borrow().contains(name)
    }

    /// Registered component names, sorted.
    #[must_use]
    pub fn registered_names(&self) -> Vec<String> {
        self.core.registry.borrow().names()
    }

    // =========================================================================
    // Instances
    // =========================================================================

    /// Number of live instances.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.core.instances.borrow().len()
    }

    /// Live keys in construction order.
    #[must_use]
    pub fn live_keys(&self) -> Vec<InstanceKey> {
        self.core.instances.borrow().keys()
    }

    /// Live instance stored under `key` (`componentName-nodeId`).
    #[must_use]
    pub fn find_instance(&self, key: &str) -> Option<InstanceHandle> {
        self.core.instances.borrow().get(key).cloned()
    }

    /// Live instance of `component` on the node carrying `node_id`.
    #[must_use]
    pub fn find_instance_by_key(&self, component: &str, node_id: &NodeId) -> Option<InstanceHandle> {
        self.find_instance(InstanceKey::new(component, node_id).as_str())
    }

    /// Every live instance on the node carrying `node_id`.
    #[must_use]
    pub fn find_instances_by_node(&self, node_id: &NodeId) -> Vec<InstanceHandle> {
        self.core.instances.borrow().by_node(node_id)
    }

    /// Identity currently written on `node`, if any.
    #[must_use]
    pub fn node_id(&self, node: NodeHandle) -> Option<NodeId> {
        self.core
            .tree
            .attribute(node, &self.core.config.id_attribute)
            .map(NodeId::new)
    }

    /// Method path addressing `method` on the instance under `key`.
    #[must_use]
    pub fn method_path(&self, method: &str, key: &str) -> MethodPath {
        MethodPath::new(key, method)
    }

    /// Invoke a method on a live instance through its key alone.
    ///
    /// # Errors
    ///
    /// - `LoaderError::InstanceNotFound` - no live instance under the key
    /// - `LoaderError::UnsupportedMethod` - the handler does not answer `method`
    pub fn invoke(&self, path: &MethodPath, args: &[Value]) -> Result<Value, LoaderError> {
        let handle = self
            .find_instance(path.key())
            .ok_or_else(|| LoaderError::InstanceNotFound(path.key().to_string()))?;

        handle
            .call(path.method(), args)
            .ok_or_else(|| LoaderError::UnsupportedMethod {
                key: handle.key().clone(),
                method: path.method().to_string(),
            })
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Retry deferred renders after a visibility change.
    ///
    /// Renders every pending instance whose node is now visible and returns
    /// how many rendered. A call made while one is already running returns 0
    /// without doing anything.
    pub fn notify_all(&self) -> usize {
        self.core.notify_all()
    }

    /// Instances still waiting to render.
    #[must_use]
    pub fn pending_render_count(&self) -> usize {
        self.core.pending_renders.borrow().len()
    }

    // =========================================================================
    // Deferred callbacks
    // =========================================================================

    /// Run every deferred callback due at `now`; returns how many ran.
    pub fn run_deferred(&self, now: Instant) -> usize {
        self.core.run_deferred(now)
    }

    /// Deferred callbacks not yet run.
    #[must_use]
    pub fn deferred_count(&self) -> usize {
        self.core.deferred.borrow().len()
    }

    /// Due time of the next deferred callback.
    #[must_use]
    pub fn next_deferred(&self) -> Option<Instant> {
        self.core.deferred.borrow().next_due()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Weak handle handed to components.
    #[must_use]
    pub fn mediator(&self) -> Mediator {
        Mediator::new(Rc::downgrade(&self.core))
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.core.config
    }

    #[must_use]
    pub fn context(&self) -> NodeHandle {
        self.core.context
    }

    /// Listeners currently on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.core.topics.subscriber_count(topic)
    }

    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.core.metrics.snapshot()
    }
}

impl MediatorApi for ComponentLoader {
    fn publish(&self, topic: &str, payload: &[Value]) -> bool {
        self.core.publish(topic, payload)
    }

    fn subscribe(&self, topic: &str, callback: Callback<Subscriber>, subscriber: Subscriber) {
        self.core.topics.subscribe(topic, callback, subscriber);
    }

    fn unsubscribe(&self, topic: &str, callback: &Callback<Subscriber>) -> bool {
        self.core.topics.unsubscribe(topic, callback)
    }

    fn scan(&self, data: Option<ComponentData>) -> Result<ScanReport, LoaderError> {
        self.core.scan(data)
    }

    fn defer(&self, delay: Duration, callback: Deferred) {
        self.core.defer(delay, callback);
    }
}

impl LoaderCore {
    pub(crate) fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub(crate) fn topics(&self) -> &TopicTable<Subscriber> {
        &self.topics
    }

    pub(crate) fn publish(&self, topic: &str, payload: &[Value]) -> bool {
        let delivered = self.topics.publish(topic, payload);
        self.metrics.record_publish(delivered);
        delivered
    }

    pub(crate) fn defer(&self, delay: Duration, callback: Deferred) {
        self.deferred
            .borrow_mut()
            .defer_at(Instant::now() + delay, callback);
    }

    fn run_deferred(&self, now: Instant) -> usize {
        // Taken out first so callbacks can defer again.
        let due = self.deferred.borrow_mut().take_due(now);
        let ran = due.len();
        for callback in due {
            callback();
        }
        ran
    }

    /// Walk the tree, construct new keys, destroy vanished ones.
    pub(crate) fn scan(&self, data: Option<ComponentData>) -> Result<ScanReport, LoaderError> {
        let scan_data = data.unwrap_or_default();
        let existing = self.instances.borrow().keys();
        let nodes = self
            .tree
            .query_marked(self.context, &self.config.marker_attribute);

        let mut active = HashSet::new();
        let mut report = ScanReport::default();

        for node in nodes {
            self.scan_node(node, &scan_data, &mut active, &mut report)?;
        }

        for key in existing {
            if !active.contains(&key) && self.destroy_instance(&key) {
                report.destroyed.push(key);
            }
        }

        self.metrics.record_scan();
        info!(
            created = report.created.len(),
            destroyed = report.destroyed.len(),
            live = self.instances.borrow().len(),
            "Scan complete"
        );
        Ok(report)
    }

    fn scan_node(
        &self,
        node: NodeHandle,
        scan_data: &ComponentData,
        active: &mut HashSet<InstanceKey>,
        report: &mut ScanReport,
    ) -> Result<(), LoaderError> {
        let Some(marker) = self.tree.attribute(node, &self.config.marker_attribute) else {
            return Ok(());
        };

        let mut names: Vec<&str> = Vec::new();
        for name in marker.split_whitespace() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        if names.is_empty() {
            return Ok(());
        }

        let stored = self.tree.attribute(node, &self.config.id_attribute);
        let resolved = self
            .identities
            .borrow_mut()
            .resolve(node, stored.as_deref());
        if resolved.assigned {
            self.tree
                .set_attribute(node, &self.config.id_attribute, resolved.id.as_str());
        }

        let mut node_layer: Option<ComponentData> = None;
        for name in names {
            let key = InstanceKey::new(name, &resolved.id);
            active.insert(key.clone());

            if self.instances.borrow().contains(key.as_str())
                || self.transitions.borrow().contains_key(&key)
            {
                continue;
            }

            let layer = node_layer.get_or_insert_with(|| self.node_data(node));
            self.create_instance(name, key.clone(), node, layer, scan_data)?;
            report.created.push(key);
        }
        Ok(())
    }

    fn node_data(&self, node: NodeHandle) -> ComponentData {
        if !self.config.merge_node_data {
            return ComponentData::new();
        }
        attribute_data(
            &self.tree.attributes(node),
            &self.config.data_prefix,
            &[&self.config.marker_attribute, &self.config.id_attribute],
        )
    }

    fn create_instance(
        &self,
        name: &str,
        key: InstanceKey,
        node: NodeHandle,
        node_layer: &ComponentData,
        scan_data: &ComponentData,
    ) -> Result<(), LoaderError> {
        let factory = self.registry.borrow().get(name).cloned();
        let Some(factory) = factory else {
            warn!(component = name, node_id = %key.node_id(), "Unknown component");
            return Err(LoaderError::UnknownComponent {
                name: name.to_string(),
                node_id: key.node_id().to_string(),
            });
        };

        let args = ComponentArgs {
            node,
            data: merge_layers([factory.defaults(), node_layer, scan_data]),
            key: key.clone(),
            mediator: Mediator::new(self.this.clone()),
        };

        self.transitions
            .borrow_mut()
            .insert(key.clone(), Transition::Constructing);
        let component = factory.construct(args);
        self.transitions.borrow_mut().remove(&key);

        let core = self.this.clone();
        let handle = InstanceHandle::new(key.clone(), node, component).with_release_hook(
            move |key| {
                if let Some(core) = core.upgrade() {
                    core.finish_destroy(key);
                }
            },
        );
        let hooks = handle.hooks();
        self.instances.borrow_mut().insert(handle.clone());
        self.metrics.record_created();
        debug!(key = %key, node = %node, "Component constructed");

        if hooks.contains(Hooks::INIT) {
            handle.run(|component| component.init());
        }

        if hooks.contains(Hooks::RENDER) {
            // init may already have removed the node and re-scanned.
            if !self.instances.borrow().contains(key.as_str()) {
                return Ok(());
            }
            if self.tree.is_visible(node) {
                handle.run(|component| component.render());
            } else {
                debug!(key = %key, "Node hidden, render deferred");
                self.pending_renders.borrow_mut().push(key);
                self.metrics.record_render_deferred();
            }
        }
        Ok(())
    }

    /// Move a live key to absent. `false` if it was not live, is already
    /// being destroyed, or its handler is busy and the destroy was parked.
    fn destroy_instance(&self, key: &InstanceKey) -> bool {
        if self.transitions.borrow().get(key) == Some(&Transition::Destroying) {
            return false;
        }
        let Some(handle) = self.instances.borrow().get(key.as_str()).cloned() else {
            return false;
        };

        self.transitions
            .borrow_mut()
            .insert(key.clone(), Transition::Destroying);

        if handle.is_busy() {
            debug!(key = %key, "Instance busy, destroy parked until its hook returns");
            handle.mark_destroy_pending();
            return false;
        }

        if handle.hooks().contains(Hooks::DESTROY) {
            handle.run(|component| component.destroy());
        }
        self.remove_instance(key);
        true
    }

    /// Complete a destroy parked while the handler was busy.
    fn finish_destroy(&self, key: &InstanceKey) {
        let Some(handle) = self.instances.borrow().get(key.as_str()).cloned() else {
            return;
        };
        if !handle.take_destroy_pending() {
            return;
        }

        if handle.hooks().contains(Hooks::DESTROY) {
            handle.run(|component| component.destroy());
        }
        self.remove_instance(key);
    }

    fn remove_instance(&self, key: &InstanceKey) {
        self.instances.borrow_mut().remove(key.as_str());
        self.pending_renders.borrow_mut().retain(|pending| pending != key);
        self.transitions.borrow_mut().remove(key);
        self.metrics.record_destroyed();
        debug!(key = %key, "Component destroyed");
    }

    fn notify_all(&self) -> usize {
        if self.notifying.replace(true) {
            debug!("Notification already in progress, ignored");
            return 0;
        }
        let _guard = NotifyGuard(&self.notifying);

        let pending = self.pending_renders.borrow().clone();
        let mut rendered = Vec::new();

        for key in pending {
            let Some(handle) = self.instances.borrow().get(key.as_str()).cloned() else {
                continue;
            };
            if self.tree.is_visible(handle.node()) && handle.run(|component| component.render()) {
                rendered.push(key);
            }
        }

        self.pending_renders
            .borrow_mut()
            .retain(|key| !rendered.contains(key));
        debug!(rendered = rendered.len(), "Pending renders notified");
        rendered.len()
    }
}
