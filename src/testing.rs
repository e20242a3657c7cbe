//! Shared schema fixtures for unit tests

use serde_json::{json, Value};

use crate::element::Element;
use crate::model::DataModel;

pub(crate) fn typ(name: &str) -> Value {
    json!({ "keyword": "type", "name": name })
}

pub(crate) fn leaf(name: &str, ty: Value, extra: Vec<Value>) -> Value {
    let mut children = vec![ty];
    children.extend(extra);
    json!({ "keyword": "leaf", "name": name, "children": children })
}

pub(crate) fn string_leaf(name: &str) -> Value {
    leaf(name, typ("string"), Vec::new())
}

pub(crate) fn statement(keyword: &str, arg: &str, value: &str) -> Value {
    let mut el = json!({ "keyword": keyword });
    el[arg] = json!(value);
    el
}

/// A router configuration schema: `authority` with a keyed `router` list
pub(crate) fn schema_document() -> Value {
    let webserver = json!({
        "keyword": "container",
        "name": "webserver",
        "children": [
            leaf("port", json!({
                "keyword": "type",
                "name": "uint16",
                "children": [statement("range", "value", "1..65535")]
            }), vec![statement("default", "value", "443")]),
            leaf("enabled", typ("boolean"), Vec::new())
        ]
    });

    let address_family = json!({
        "keyword": "choice",
        "name": "address-family",
        "children": [
            { "keyword": "when", "condition": "../family != ''" },
            {
                "keyword": "case",
                "name": "ipv4",
                "children": [string_leaf("ipv4-address")]
            },
            {
                "keyword": "case",
                "name": "ipv6",
                "children": [
                    string_leaf("ipv6-address"),
                    {
                        "keyword": "container",
                        "name": "ipv6-options",
                        "children": [
                            statement("presence", "value", "Enables IPv6 options"),
                            leaf("mtu", typ("uint16"), Vec::new())
                        ]
                    }
                ]
            },
            {
                "keyword": "case",
                "name": "unnumbered",
                "children": [
                    statement("visibility", "text", "hidden"),
                    leaf("no-address", typ("empty"), Vec::new())
                ]
            }
        ]
    });

    let node = json!({
        "keyword": "list",
        "name": "node",
        "children": [
            statement("key", "value", "name"),
            string_leaf("name"),
            leaf("role", json!({
                "keyword": "type",
                "name": "enumeration",
                "children": [
                    { "keyword": "enum", "name": "conductor" },
                    { "keyword": "enum", "name": "combo" },
                    {
                        "keyword": "enum",
                        "name": "slice",
                        "children": [statement("status", "value", "obsolete")]
                    }
                ]
            }), Vec::new()),
            {
                "keyword": "leaf-list",
                "name": "tag",
                "children": [typ("string"), statement("ordered-by", "value", "user")]
            }
        ]
    });

    let router = json!({
        "keyword": "list",
        "name": "router",
        "children": [
            statement("key", "value", "name"),
            statement("unique", "tag", "location description"),
            string_leaf("name"),
            string_leaf("location"),
            leaf("description", typ("string"), vec![statement("status", "value", "deprecated")]),
            leaf("metric", json!({
                "keyword": "type",
                "name": "decimal64",
                "children": [statement("fraction-digits", "value", "3")]
            }), vec![statement("units", "name", "ms")]),
            leaf("family", json!({
                "keyword": "type",
                "name": "identityref",
                "children": [statement("base", "name", "t128:address-type")]
            }), Vec::new()),
            {
                "keyword": "container",
                "name": "system",
                "children": [
                    { "keyword": "container", "name": "services", "children": [webserver] },
                    leaf("state", typ("string"), vec![statement("config", "value", "false")])
                ]
            },
            node,
            {
                "keyword": "container",
                "name": "bfd",
                "children": [
                    statement("visibility", "text", "advanced"),
                    string_leaf("state"),
                    leaf("secret", typ("string"), vec![statement("visibility", "text", "hidden")])
                ]
            },
            {
                "keyword": "list",
                "name": "peer",
                "children": [statement("key", "value", "name"), string_leaf("name"), string_leaf("router-name")]
            },
            address_family,
            {
                "keyword": "leaf-list",
                "name": "dns-server",
                "children": [typ("string")]
            },
            {
                "keyword": "notification",
                "name": "router-up"
            }
        ]
    });

    json!({
        "keyword": "module",
        "name": "t128",
        "namespace": "urn:ietf:params:xml:ns:yang:yin:1",
        "module-name": "t128",
        "module-prefix": "t128",
        "nsmap": { "t128": "http://128technology.com/t128" },
        "children": [
            {
                "keyword": "identity",
                "name": "ipv4",
                "children": [statement("base", "name", "t128:address-type")]
            },
            {
                "keyword": "identity",
                "name": "ipv6",
                "children": [statement("base", "name", "t128:address-type")]
            },
            {
                "keyword": "container",
                "name": "config",
                "children": [{
                    "keyword": "container",
                    "name": "authority",
                    "children": [string_leaf("name"), router]
                }]
            }
        ]
    })
}

pub(crate) fn data_model() -> DataModel {
    let doc = Element::from_value(schema_document()).unwrap();
    DataModel::from_element(&doc, |doc| doc.descend(&["config", "authority"])).unwrap()
}
