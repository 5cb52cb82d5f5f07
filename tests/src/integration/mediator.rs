//! # Mediator Scenarios
//!
//! Components talking to each other only through topics.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Harness, Recorder};
    use component_loader::{
        callback, Callback, Component, ComponentBase, ComponentFactory, Hooks, MediatorApi,
        NodeTree, Subscriber, Value,
    };
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Received = Rc<RefCell<Vec<String>>>;

    fn tagged(received: &Received, tag: &'static str) -> Callback<Subscriber> {
        let received = received.clone();
        callback(move |_who: &Subscriber, payload: &[Value]| {
            received
                .borrow_mut()
                .push(format!("{tag}:{}", Value::Array(payload.to_vec())));
        })
    }

    // =============================================================================
    // TOPIC TABLE THROUGH THE LOADER
    // =============================================================================

    #[test]
    fn test_publish_in_subscription_order() {
        let h = Harness::new(&[], &[]);
        let received = Received::default();

        h.loader.subscribe("evt", tagged(&received, "first"), None);
        h.loader.subscribe("evt", tagged(&received, "second"), None);
        h.loader.subscribe("other", tagged(&received, "other"), None);

        assert!(h.loader.publish("evt", &[json!(1), json!("two")]));
        assert_eq!(
            *received.borrow(),
            vec![r#"first:[1,"two"]"#, r#"second:[1,"two"]"#]
        );
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let h = Harness::new(&[], &[]);
        let received = Received::default();
        let first = tagged(&received, "first");

        h.loader.subscribe("evt", first.clone(), None);
        h.loader.subscribe("evt", tagged(&received, "second"), None);
        assert!(h.loader.unsubscribe("evt", &first));
        assert!(!h.loader.unsubscribe("evt", &first));
        assert!(!h.loader.unsubscribe("missing", &first));

        h.loader.publish("evt", &[]);
        assert_eq!(*received.borrow(), vec!["second:[]"]);
        assert_eq!(h.loader.subscriber_count("evt"), 1);
    }

    #[test]
    fn test_unsubscribe_removes_first_match_only() {
        let h = Harness::new(&[], &[]);
        let received = Received::default();
        let shared = tagged(&received, "shared");

        h.loader.subscribe("evt", shared.clone(), None);
        h.loader.subscribe("evt", shared.clone(), None);
        assert!(h.loader.unsubscribe("evt", &shared));

        h.loader.publish("evt", &[]);
        assert_eq!(received.borrow().len(), 1);
    }

    #[test]
    fn test_publish_without_subscribers_is_reported() {
        let h = Harness::new(&[], &[]);
        assert!(!h.loader.publish("nobody", &[json!(true)]));
        assert_eq!(h.loader.metrics().publishes_dropped, 1);
    }

    #[test]
    fn test_recursive_publish_runs_full_traversals() {
        let h = Harness::new(&[], &[]);
        let received = Received::default();
        let depth = Rc::new(RefCell::new(0));

        let mediator = h.loader.mediator();
        let (log, counter) = (received.clone(), depth.clone());
        h.loader.subscribe(
            "tick",
            callback(move |_: &Subscriber, _: &[Value]| {
                log.borrow_mut().push("repeater".to_string());
                let next = {
                    let mut d = counter.borrow_mut();
                    *d += 1;
                    *d
                };
                if next < 3 {
                    mediator.publish("tick", &[]);
                }
            }),
            None,
        );
        h.loader.subscribe("tick", tagged(&received, "tail"), None);

        h.loader.publish("tick", &[]);
        assert_eq!(
            *received.borrow(),
            vec!["repeater", "repeater", "repeater", "tail:[]", "tail:[]", "tail:[]"]
        );
    }

    #[test]
    fn test_subscribe_during_publish_waits_for_next_publish() {
        let h = Harness::new(&[], &[]);
        let received = Received::default();

        let mediator = h.loader.mediator();
        let late = tagged(&received, "late");
        h.loader.subscribe(
            "evt",
            callback(move |_: &Subscriber, _: &[Value]| {
                mediator.subscribe("evt", late.clone(), None);
            }),
            None,
        );

        h.loader.publish("evt", &[]);
        assert!(received.borrow().is_empty());
        h.loader.publish("evt", &[]);
        assert_eq!(*received.borrow(), vec!["late:[]"]);
    }

    // =============================================================================
    // COMPONENTS ON THE BUS
    // =============================================================================

    /// Subscribes in `init`, unsubscribes in `destroy`.
    struct Listener {
        base: ComponentBase,
        received: Received,
        callback: Option<Callback<Subscriber>>,
    }

    impl Component for Listener {
        fn hooks(&self) -> Hooks {
            Hooks::INIT | Hooks::DESTROY
        }

        fn init(&mut self) {
            let received = self.received.clone();
            let cb = callback(move |who: &Subscriber, payload: &[Value]| {
                let who = who.as_ref().map(ToString::to_string).unwrap_or_default();
                received
                    .borrow_mut()
                    .push(format!("{who} got {}", Value::Array(payload.to_vec())));
            });
            self.base.subscribe("greeting", cb.clone());
            self.callback = Some(cb);
        }

        fn destroy(&mut self) {
            if let Some(cb) = self.callback.take() {
                self.base.unsubscribe("greeting", &cb);
            }
        }
    }

    /// Publishes a greeting carrying its constructor data in `init`.
    struct Greeter {
        base: ComponentBase,
    }

    impl Component for Greeter {
        fn hooks(&self) -> Hooks {
            Hooks::INIT
        }

        fn init(&mut self) {
            let name = self.base.data().get("name").cloned().unwrap_or(Value::Null);
            self.base.publish("greeting", &[name]);
        }
    }

    fn bus_harness(markers: &[&str]) -> (Harness, Received) {
        let h = Harness::new(markers, &[]);
        let received = Received::default();
        let sink = received.clone();
        h.loader.register([
            (
                "Listener",
                ComponentFactory::new(move |args| Listener {
                    base: ComponentBase::new(args),
                    received: sink.clone(),
                    callback: None,
                }),
            ),
            (
                "Greeter",
                ComponentFactory::new(|args| Greeter {
                    base: ComponentBase::new(args),
                }),
            ),
        ]);
        (h, received)
    }

    #[test]
    fn test_components_talk_through_topics() -> anyhow::Result<()> {
        let (h, received) = bus_harness(&["Listener", "Listener"]);
        h.tree.append(
            h.tree.root(),
            &[("data-component", "Greeter"), ("data-name", "ada")],
        );

        h.loader.scan(None)?;
        assert_eq!(
            *received.borrow(),
            vec![r#"Listener-1 got ["ada"]"#, r#"Listener-2 got ["ada"]"#]
        );
        Ok(())
    }

    #[test]
    fn test_destroyed_listener_no_longer_called() -> anyhow::Result<()> {
        let (h, received) = bus_harness(&["Listener", "Listener"]);
        h.loader.scan(None)?;

        h.tree.remove(h.nodes[0]);
        h.loader.scan(None)?;
        assert_eq!(h.loader.subscriber_count("greeting"), 1);

        h.loader.publish("greeting", &[json!("late")]);
        assert_eq!(*received.borrow(), vec![r#"Listener-2 got ["late"]"#]);
        Ok(())
    }

    #[test]
    fn test_component_base_binds_own_key() -> anyhow::Result<()> {
        let h = Harness::new(&["A"], &["A"]);
        h.loader.scan(None)?;
        let seen = Rc::new(RefCell::new(None));

        let sink = seen.clone();
        let cb = callback(move |who: &Subscriber, _: &[Value]| {
            *sink.borrow_mut() = who.clone();
        });
        let handle = h.loader.find_instance("A-1").unwrap();
        handle.with(|recorder: &Recorder| recorder.base().subscribe("ping", cb.clone()));

        h.loader.publish("ping", &[]);
        assert_eq!(seen.borrow().as_ref(), Some(handle.key()));
        Ok(())
    }

    #[test]
    fn test_mediator_after_loader_dropped() {
        let h = Harness::new(&["A"], &["A"]);
        let mediator = h.loader.mediator();
        let received = Received::default();
        let cb = tagged(&received, "x");
        drop(h);

        mediator.subscribe("evt", cb.clone(), None);
        assert!(!mediator.publish("evt", &[]));
        assert!(!mediator.unsubscribe("evt", &cb));
        assert_eq!(mediator.subscriber_count("evt"), 0);
        assert!(mediator.loader().is_none());
        assert!(mediator.scan(None).is_err());
    }
}
