//! Shared test fixtures: a recording component and a ready-made loader.

use component_loader::{
    Component, ComponentBase, ComponentFactory, ComponentLoader, Hooks, IdentityIssuer,
    InstanceKey, MemoryTree, NodeHandle, NodeId, Value,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Ordered record of lifecycle events, e.g. `"init A-1"`.
pub type EventLog = Rc<RefCell<Vec<String>>>;

/// Component that writes every hook call to an [`EventLog`].
pub struct Recorder {
    base: ComponentBase,
    hooks: Hooks,
    log: EventLog,
}

impl Recorder {
    pub fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn note(&self, event: &str) {
        self.log
            .borrow_mut()
            .push(format!("{event} {}", self.base.key()));
    }
}

impl Component for Recorder {
    fn hooks(&self) -> Hooks {
        self.hooks
    }

    fn init(&mut self) {
        self.note("init");
    }

    fn render(&mut self) {
        self.note("render");
    }

    fn destroy(&mut self) {
        self.note("destroy");
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Option<Value> {
        match method {
            "echo" => Some(Value::Array(args.to_vec())),
            "data" => Some(Value::Object(self.base.data().clone())),
            "key" => Some(Value::String(self.base.key().to_string())),
            _ => None,
        }
    }
}

/// Factory for a [`Recorder`] declaring `hooks`.
pub fn recorder(log: &EventLog, hooks: Hooks) -> ComponentFactory {
    let log = log.clone();
    ComponentFactory::new(move |args| {
        log.borrow_mut().push(format!("new {}", args.key));
        Recorder {
            base: ComponentBase::new(args),
            hooks,
            log: log.clone(),
        }
    })
}

/// Issuer handing out "1", "2", ... so keys are predictable.
pub fn sequential_ids() -> IdentityIssuer {
    let mut next = 0u64;
    IdentityIssuer::with_generator(move || {
        next += 1;
        NodeId::new(next.to_string())
    })
}

pub fn key_strings(keys: &[InstanceKey]) -> Vec<String> {
    keys.iter().map(ToString::to_string).collect()
}

/// Tree of marked root children plus a loader with recorders registered.
pub struct Harness {
    pub tree: Rc<MemoryTree>,
    pub nodes: Vec<NodeHandle>,
    pub loader: ComponentLoader,
    pub log: EventLog,
}

impl Harness {
    /// One root child per marker; `names` registered with every hook.
    pub fn new(markers: &[&str], names: &[&str]) -> Self {
        loader_telemetry::init_test_logging();

        let (tree, nodes) = MemoryTree::from_markers(markers);
        let tree = Rc::new(tree);
        let loader = ComponentLoader::with_identities(tree.clone(), sequential_ids());
        let log = EventLog::default();
        loader.register(
            names
                .iter()
                .map(|name| (*name, recorder(&log, Hooks::all())))
                .collect::<Vec<_>>(),
        );

        Self {
            tree,
            nodes,
            loader,
            log,
        }
    }

    /// Events starting with `kind`, in order.
    pub fn events(&self, kind: &str) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter(|event| event.split(' ').next() == Some(kind))
            .cloned()
            .collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events(kind).len()
    }
}
