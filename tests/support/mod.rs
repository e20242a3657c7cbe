//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use yang_datamodel::{DataModel, DataModelInstance, Element};

pub fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

pub fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).expect("fixture is readable")
}

pub fn schema_document() -> Element {
    Element::from_json_str(&read_fixture("model.json")).expect("fixture schema parses")
}

pub fn data_model() -> Arc<DataModel> {
    let doc = schema_document();
    let model = DataModel::from_element(&doc, |doc| doc.descend(&["config", "authority"]))
        .expect("fixture schema compiles");
    Arc::new(model)
}

pub fn instance_json() -> Value {
    serde_json::from_str(&read_fixture("instance.json")).expect("fixture instance parses")
}

pub fn data_model_instance() -> DataModelInstance {
    DataModelInstance::new(data_model(), &instance_json()).expect("fixture instance binds")
}
