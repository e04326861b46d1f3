use quad_core::responses::{LocationRow, StatusResponse, SyncResponse};
use quad_core::{Coordinates, ViewportState};
use schemars::{Schema, schema_for};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

const TYPE_NAMES: &[&str] = &["status", "sync", "location", "viewport", "coordinates"];

/// Handle `quad schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schema_named(&args.type_name)?;
    output(&schema, flags.format)
}

fn schema_named(name: &str) -> anyhow::Result<Schema> {
    let schema = match name.trim().to_ascii_lowercase().as_str() {
        "status" => schema_for!(StatusResponse),
        "sync" => schema_for!(SyncResponse),
        "location" | "locations" => schema_for!(Vec<LocationRow>),
        "viewport" => schema_for!(ViewportState),
        "coordinates" => schema_for!(Coordinates),
        other => anyhow::bail!(
            "unknown schema type '{other}' (expected one of: {})",
            TYPE_NAMES.join(", ")
        ),
    };
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::{TYPE_NAMES, schema_named};

    #[test]
    fn every_listed_type_has_a_schema() {
        for name in TYPE_NAMES {
            let schema = schema_named(name).expect("schema should exist");
            let value = serde_json::to_value(&schema).expect("schema should serialize");
            assert!(value.is_object(), "{name} schema is not an object");
        }
    }

    #[test]
    fn status_schema_names_its_fields() {
        let value = serde_json::to_value(schema_named("status").unwrap()).unwrap();
        let properties = value["properties"].as_object().expect("properties");
        assert!(properties.contains_key("watermark"));
        assert!(properties.contains_key("degraded"));
    }

    #[test]
    fn unknown_type_lists_choices() {
        let err = schema_named("marker").unwrap_err();
        assert!(err.to_string().contains("status, sync"));
    }
}
