//! Schema model integration tests
//!
//! These tests compile the fixture module through the public API and check
//! the resulting registry, types and statement metadata.

mod support;

use pretty_assertions::assert_eq;
use yang_datamodel::{DataModel, Element, NodeType, Type};

use support::{data_model, schema_document};

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_root_and_registry() {
    let model = data_model();

    assert_eq!(model.root_name(), "authority");
    assert_eq!(model.root().node_type(), NodeType::Container);

    let paths: Vec<&str> = model.registry().map(|(path, _)| path).collect();
    for expected in [
        "authority",
        "authority.name",
        "authority.router",
        "authority.router.system.services.webserver-port",
        "authority.router.node.device-interface.pppoe.user-name",
        "authority.router.redundancy",
        "authority.router.active-node",
        "authority.security.encrypt",
    ] {
        assert!(paths.contains(&expected), "missing {}", expected);
    }

    assert!(!paths.contains(&"authority.router.system.uptime"));
    assert!(!paths.contains(&"authority.router.redundancy.active"));
}

#[test]
fn test_registry_paths_match_nodes() {
    let model = data_model();
    for (path, node) in model.registry() {
        assert_eq!(node.path(), path);
        assert_eq!(model.get_model_for_path(path).unwrap(), node);
    }
}

#[test]
fn test_unknown_path() {
    let model = data_model();
    let err = model.get_model_for_path("authority.nothing").unwrap_err();
    assert_eq!(err.to_string(), "Model not found for path authority.nothing");
}

#[test]
fn test_wrong_root_selector() {
    let doc = schema_document();
    match DataModel::from_element(&doc, |doc| doc.descend(&["config", "tenant"])) {
        Err(e) => assert!(e.is_schema_error()),
        Ok(_) => panic!("root selector must fail"),
    }
}

#[test]
fn test_visit_covers_registry() {
    let model = data_model();
    let mut visited = 0;
    model.visit(|_| visited += 1);

    // Cases are visited but not registered.
    assert_eq!(visited, model.registry().count() + 2);
}

// ============================================================================
// Nodes
// ============================================================================

#[test]
fn test_statement_metadata() {
    let model = data_model();
    let root = model.root();

    assert_eq!(root.description(), Some("The authority configuration."));
    assert_eq!(root.namespace().prefix, "t128");
    assert_eq!(root.namespace().uri, "http://128technology.com/t128");

    let name = root.child("name").unwrap();
    assert!(name.is_mandatory());
    assert!(name.is_required());
    assert!(!name.is_key());
}

#[test]
fn test_list_keys_and_unique() {
    let model = data_model();
    let peer = model.get_model_for_path("authority.router.peer").unwrap();

    assert_eq!(peer.keys(), &["name".to_string()]);
    assert_eq!(peer.key_nodes()[0].name(), "name");

    let router_name = peer.child("routerName").unwrap();
    assert_eq!(router_name.name(), "router-name");
    assert!(router_name.is_unique());
    assert_eq!(router_name.unique_with(), &["authority-name".to_string()]);
}

#[test]
fn test_typedef_chain() {
    let model = data_model();
    let port = model
        .get_model_for_path("authority.router.system.services.webserver-port")
        .unwrap();

    assert_eq!(port.default(), Some("80"));
    assert_eq!(port.units(), Some("port"));
    assert!(matches!(port.leaf_type(), Some(Type::Derived(_))));
    assert!(matches!(port.resolved_type(), Some(Type::Integer(_))));
    assert_eq!(port.leaf_type().and_then(Type::description), Some("A transport layer port."));
}

#[test]
fn test_leaf_defaults_and_options() {
    let model = data_model();
    let log_level = model.get_model_for_path("authority.router.system.log-level").unwrap();

    assert_eq!(log_level.default(), Some("info"));
    assert_eq!(
        log_level.leaf_type().map(Type::options).unwrap(),
        vec!["fatal", "error", "info", "debug"]
    );
}

#[test]
fn test_identities() {
    let model = data_model();

    assert_eq!(model.identities().get_options("address-family"), vec!["t128:ipv4", "t128:ipv6"]);
    assert_eq!(model.identities().get("address-family")[0].description.as_deref(), Some("IPv4 addressing."));

    let family = model.get_model_for_path("authority.router.address-family").unwrap();
    assert_eq!(family.leaf_type().map(Type::options).unwrap(), vec!["t128:ipv4", "t128:ipv6"]);
}

#[test]
fn test_choice_and_cases() {
    let model = data_model();
    let router = model.get_model_for_path("authority.router").unwrap();
    let choice = model.get_model_for_path("authority.router.redundancy").unwrap();

    assert_eq!(choice.node_type(), NodeType::Choice);
    assert_eq!(choice.case_names(), vec!["active", "standby"]);
    assert_eq!(router.choices().count(), 1);

    let active_node = router.child("activeNode").unwrap();
    let case = active_node.choice_case().unwrap();
    assert_eq!(case.name(), "active");
    assert_eq!(case.parent_choice(), Some(choice));
    assert_eq!(active_node.parent(), Some(router));
}

#[test]
fn test_when_inheritance() {
    let model = data_model();
    let pppoe = model.get_model_for_path("authority.router.node.device-interface.pppoe").unwrap();
    let user_name = pppoe.child("user-name").unwrap();
    let interface_type = model.get_model_for_path("authority.router.node.device-interface.type").unwrap();

    assert_eq!(pppoe.when()[0].condition, "../type = 'pppoe'");
    assert!(pppoe.has_when_ancestor_or_self());
    assert!(user_name.has_when_ancestor_or_self());
    assert!(user_name.when().is_empty());
    assert!(!interface_type.has_when_ancestor_or_self());
}

#[test]
fn test_visibility() {
    let model = data_model();
    let password = model
        .get_model_for_path("authority.router.node.device-interface.pppoe.password")
        .unwrap();
    let user_name = model
        .get_model_for_path("authority.router.node.device-interface.pppoe.user-name")
        .unwrap();

    assert!(!password.is_visible());
    assert!(user_name.is_visible());
}

#[test]
fn test_missing_type_is_schema_error() {
    let doc = Element::from_value(serde_json::json!({
        "keyword": "module",
        "name": "broken",
        "module-prefix": "b",
        "nsmap": { "b": "urn:broken" },
        "children": [{
            "keyword": "container",
            "name": "config",
            "children": [{ "keyword": "leaf", "name": "orphan" }]
        }]
    }))
    .unwrap();

    match DataModel::from_element(&doc, |doc| doc.descend(&["config"])) {
        Err(e) => assert!(e.is_schema_error(), "unexpected error {}", e),
        Ok(_) => panic!("a leaf without type must not compile"),
    }
}
