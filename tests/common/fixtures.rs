use igm_config_ui::schema::{parser::parse_schema, schema_model::Schema};
use serde_json::{Value, json};

pub fn fixture_path(name: &str) -> String {
    let base = std::env::current_dir().unwrap();
    base.join("tests").join("fixtures").join(name).display().to_string()
}

pub fn igm_schema_value() -> Value {
    let text = std::fs::read_to_string(fixture_path("igm_schema.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Pipeline-style schema: 13 fields (one 3-wide array), 4 groups, 1 optional.
pub fn igm_schema() -> Schema {
    parse_schema(&igm_schema_value()).unwrap()
}

pub fn schema_from(value: Value) -> Schema {
    parse_schema(&value).unwrap()
}

/// A stored configuration touching every section, restraints included.
pub fn full_config() -> Value {
    json!({
        "genome": {
            "assembly": "mm10",
            "ploidy": "haploid",
            "segment_length": 100000
        },
        "model": {
            "mode": "advanced",
            "radius": 2.5,
            "center": [1, 2, 3],
            "restraints": {
                "tolerance": 0.1,
                "advanced_k": 5
            }
        },
        "optimization": {
            "seed": 42,
            "keep_temporary_files": true,
            "iterations": [4, 5],
            "input_file": "/data/input.hic",
            "kernel": "gauss"
        }
    })
}
