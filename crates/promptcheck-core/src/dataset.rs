use crate::errors::EvalError;
use crate::model::TestCase;
use std::collections::HashSet;
use std::path::Path;

/// Load the ordered test case set from a JSON array of objects.
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>, EvalError> {
    let raw = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    parse_test_cases(&raw).map_err(|detail| EvalError::MalformedData {
        path: path.to_path_buf(),
        detail,
    })
}

pub(crate) fn parse_test_cases(raw: &str) -> Result<Vec<TestCase>, String> {
    let doc: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))?;

    let items = doc
        .as_array()
        .ok_or_else(|| format!("expected a JSON array of test cases, found {}", kind_of(&doc)))?;

    let mut cases = Vec::with_capacity(items.len());
    let mut seen = HashSet::new();
    for (idx, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| format!("element {} is {}, expected an object", idx, kind_of(item)))?;
        match obj.get("id") {
            Some(serde_json::Value::String(_)) => {}
            Some(other) => {
                return Err(format!(
                    "element {}: 'id' must be a string, found {}",
                    idx,
                    kind_of(other)
                ))
            }
            None => return Err(format!("element {}: missing required field 'id'", idx)),
        }

        let case: TestCase = serde_json::from_value(item.clone())
            .map_err(|e| format!("element {}: {}", idx, e))?;
        if !seen.insert(case.id.clone()) {
            tracing::warn!(id = %case.id, "duplicate test case id");
        }
        cases.push(case);
    }
    Ok(cases)
}

fn kind_of(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
