use schemars::schema_for;

use crate::json::{plan, types};

pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(types::DispatchInput))
}

pub fn generate_plan_json_schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(plan::JsonDispatchPlan))
}
