//! # Rendering Scenarios
//!
//! Render hooks wait for visibility; `notify_all` retries them once the host
//! reports a visibility change. Also covers the deferred-callback helper.

#[cfg(test)]
mod tests {
    use crate::fixtures::{recorder, EventLog, Harness, Recorder};
    use component_loader::{
        Component, ComponentBase, ComponentFactory, ComponentLoader, Hooks, MediatorApi,
        MemoryTree, NodeTree,
    };
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn test_visible_node_renders_immediately() -> anyhow::Result<()> {
        let h = Harness::new(&["A"], &["A"]);
        h.loader.scan(None)?;

        assert_eq!(h.events("render"), vec!["render A-1"]);
        assert_eq!(h.loader.pending_render_count(), 0);
        Ok(())
    }

    #[test]
    fn test_hidden_ancestor_defers_render() -> anyhow::Result<()> {
        let h = Harness::new(&[], &["A"]);
        let panel = h.tree.append(h.tree.root(), &[]);
        h.tree.append(panel, &[("data-component", "A")]);
        h.tree.set_hidden(panel, true);

        h.loader.scan(None)?;
        assert_eq!(h.events("init"), vec!["init A-1"]);
        assert!(h.events("render").is_empty());
        assert_eq!(h.loader.pending_render_count(), 1);

        // Still hidden: nothing to do.
        assert_eq!(h.loader.notify_all(), 0);

        h.tree.set_hidden(panel, false);
        assert_eq!(h.loader.notify_all(), 1);
        assert_eq!(h.events("render"), vec!["render A-1"]);
        assert_eq!(h.loader.notify_all(), 0);
        Ok(())
    }

    #[test]
    fn test_notify_renders_only_visible_subset() -> anyhow::Result<()> {
        let h = Harness::new(&["A", "A"], &["A"]);
        h.tree.set_hidden(h.nodes[0], true);
        h.tree.set_hidden(h.nodes[1], true);
        h.loader.scan(None)?;

        h.tree.set_hidden(h.nodes[1], false);
        assert_eq!(h.loader.notify_all(), 1);
        assert_eq!(h.events("render"), vec!["render A-2"]);
        assert_eq!(h.loader.pending_render_count(), 1);
        Ok(())
    }

    #[test]
    fn test_destroyed_before_visible_never_renders() -> anyhow::Result<()> {
        let h = Harness::new(&["A"], &["A"]);
        h.tree.set_hidden(h.nodes[0], true);
        h.loader.scan(None)?;

        h.tree.remove(h.nodes[0]);
        h.loader.scan(None)?;
        h.tree.set_hidden(h.nodes[0], false);

        assert_eq!(h.loader.notify_all(), 0);
        assert!(h.events("render").is_empty());
        assert_eq!(h.count("destroy"), 1);
        Ok(())
    }

    #[test]
    fn test_no_render_hook_never_queued() -> anyhow::Result<()> {
        let h = Harness::new(&[], &[]);
        let log = EventLog::default();
        h.loader
            .register([("Quiet", recorder(&log, Hooks::INIT | Hooks::DESTROY))]);
        let node = h.tree.append(h.tree.root(), &[("data-component", "Quiet")]);
        h.tree.set_hidden(node, true);

        h.loader.scan(None)?;
        assert_eq!(h.loader.pending_render_count(), 0);
        assert_eq!(*log.borrow(), vec!["new Quiet-1", "init Quiet-1"]);
        Ok(())
    }

    /// Calls `notify_all` again from inside its own render.
    struct Storm {
        base: ComponentBase,
        nested: Rc<Cell<Option<usize>>>,
    }

    impl Component for Storm {
        fn hooks(&self) -> Hooks {
            Hooks::RENDER
        }

        fn render(&mut self) {
            let nested = self.base.mediator().loader().map(|loader| loader.notify_all());
            self.nested.set(nested);
        }
    }

    #[test]
    fn test_notify_storm_is_dropped() -> anyhow::Result<()> {
        let (tree, nodes) = MemoryTree::from_markers(&["Storm", "Storm"]);
        let tree = Rc::new(tree);
        let loader = ComponentLoader::new(tree.clone());
        let nested = Rc::new(Cell::new(None));
        let captured = nested.clone();
        loader.register([(
            "Storm",
            ComponentFactory::new(move |args| Storm {
                base: ComponentBase::new(args),
                nested: captured.clone(),
            }),
        )]);

        for node in &nodes {
            tree.set_hidden(*node, true);
        }
        loader.scan(None)?;
        for node in &nodes {
            tree.set_hidden(*node, false);
        }

        assert_eq!(loader.notify_all(), 2);
        assert_eq!(nested.get(), Some(0));
        assert_eq!(loader.pending_render_count(), 0);
        Ok(())
    }

    #[test]
    fn test_component_defers_work() -> anyhow::Result<()> {
        let h = Harness::new(&["A"], &["A"]);
        h.loader.scan(None)?;
        let order = Rc::new(RefCell::new(Vec::new()));

        let handle = h.loader.find_instance("A-1").unwrap();
        handle.with(|recorder: &Recorder| {
            let (late, early) = (order.clone(), order.clone());
            recorder
                .base()
                .defer_for(Duration::from_millis(40), move || late.borrow_mut().push("late"));
            recorder.base().defer(move || early.borrow_mut().push("early"));
        });
        assert_eq!(h.loader.deferred_count(), 2);

        let first_due = h.loader.next_deferred().unwrap();
        assert_eq!(h.loader.run_deferred(first_due), 1);
        assert_eq!(*order.borrow(), vec!["early"]);

        assert_eq!(h.loader.run_deferred(first_due + Duration::from_millis(40)), 1);
        assert_eq!(*order.borrow(), vec!["early", "late"]);
        Ok(())
    }

    #[test]
    fn test_deferred_callback_can_rescan() -> anyhow::Result<()> {
        let h = Harness::new(&["A"], &["A"]);
        h.loader.scan(None)?;

        let mediator = h.loader.mediator();
        let tree = h.tree.clone();
        h.loader.defer(
            Duration::ZERO,
            Box::new(move || {
                tree.append(tree.root(), &[("data-component", "A")]);
                let _ = mediator.scan(None);
            }),
        );

        let due = h.loader.next_deferred().unwrap();
        assert_eq!(h.loader.run_deferred(due), 1);
        assert_eq!(h.loader.live_count(), 2);
        Ok(())
    }
}
