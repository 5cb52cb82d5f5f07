//! # Invocation Scenarios
//!
//! Reaching a live instance from outside the component graph, knowing only
//! its key.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Harness, Recorder};
    use component_loader::{LoaderError, MediatorApi, MethodPath, NodeId};
    use serde_json::json;

    #[test]
    fn test_find_instance_by_key_string() -> anyhow::Result<()> {
        let h = Harness::new(&["A B"], &["A", "B"]);
        h.loader.scan(None)?;

        let handle = h.loader.find_instance("B-1").unwrap();
        assert_eq!(handle.key().component(), "B");
        assert_eq!(handle.node(), h.nodes[0]);
        assert!(handle.is::<Recorder>());
        assert!(h.loader.find_instance("C-1").is_none());

        let same = h.loader.find_instance_by_key("B", &NodeId::new("1")).unwrap();
        assert_eq!(same.key(), handle.key());
        Ok(())
    }

    #[test]
    fn test_method_path_round_trip_through_text() -> anyhow::Result<()> {
        let h = Harness::new(&["A"], &["A"]);
        h.loader.scan(None)?;

        let text = h.loader.method_path("echo", "A-1").to_string();
        assert_eq!(text, "ComponentLoader.findInstanceById('A-1').echo");

        // A separate runtime only ever holds the string.
        let path: MethodPath = text.parse()?;
        let result = h.loader.invoke(&path, &[json!(1), json!({"k": "v"})])?;
        assert_eq!(result, json!([1, {"k": "v"}]));
        Ok(())
    }

    #[test]
    fn test_invoke_after_destroy_fails() -> anyhow::Result<()> {
        let h = Harness::new(&["A"], &["A"]);
        h.loader.scan(None)?;
        let path = h.loader.method_path("key", "A-1");
        assert_eq!(h.loader.invoke(&path, &[])?, json!("A-1"));

        h.tree.remove(h.nodes[0]);
        h.loader.scan(None)?;

        let err = h.loader.invoke(&path, &[]).unwrap_err();
        assert_eq!(err, LoaderError::InstanceNotFound("A-1".to_string()));
        Ok(())
    }

    #[test]
    fn test_invoke_unknown_method() -> anyhow::Result<()> {
        let h = Harness::new(&["A"], &["A"]);
        h.loader.scan(None)?;

        let err = h
            .loader
            .invoke(&h.loader.method_path("launch", "A-1"), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            LoaderError::UnsupportedMethod { ref method, .. } if method == "launch"
        ));
        Ok(())
    }

    #[test]
    fn test_malformed_path_rejected() {
        let err = "window.findInstanceById('A-1').echo"
            .parse::<MethodPath>()
            .unwrap_err();
        assert!(matches!(err, LoaderError::InvalidMethodPath(_)));
    }

    #[test]
    fn test_typed_access_to_live_instance() -> anyhow::Result<()> {
        let h = Harness::new(&["A"], &["A"]);
        h.loader.scan(None)?;

        let key = h
            .loader
            .find_instance("A-1")
            .and_then(|handle| handle.with(|recorder: &Recorder| recorder.base().key().clone()))
            .unwrap();
        assert_eq!(key.as_str(), "A-1");
        Ok(())
    }
}
