//! TOML output: render a projected document with toml_edit.
//!
//! Mapping:
//!   - Value::Null          -> error (TOML has no null)
//!   - Value::Bool          -> TOML boolean
//!   - Value::Integer       -> TOML integer (if it fits in i64, otherwise error)
//!   - Value::Float         -> TOML float
//!   - Value::String        -> TOML string
//!   - Value::Array         -> array of tables when every item is an object,
//!                             otherwise an inline array
//!   - Value::Object        -> TOML table (inline inside arrays)
//!
//! TOML requires the top-level value to be a table. Keys with empty values
//! project to null and therefore cannot be written as TOML.

use libminyaml::Value;
use num_traits::ToPrimitive;
use toml_edit::{Array, ArrayOfTables, DocumentMut, Formatted, InlineTable, Item, Table};

/// Encode a projected value as TOML text.
pub fn encode(value: &Value) -> Result<String, String> {
    let Value::Object(entries) = value else {
        return Err("TOML requires the top-level value to be a table/object".to_string());
    };
    let mut doc = DocumentMut::new();
    for (key, item) in entries {
        doc[key.as_str()] = to_item(item)?;
    }
    Ok(doc.to_string())
}

fn to_item(value: &Value) -> Result<Item, String> {
    match value {
        Value::Object(entries) => Ok(Item::Table(to_table(entries)?)),
        Value::Array(items) if !items.is_empty() && items.iter().all(is_object) => {
            let mut tables = ArrayOfTables::new();
            for item in items {
                if let Value::Object(entries) = item {
                    tables.push(to_table(entries)?);
                }
            }
            Ok(Item::ArrayOfTables(tables))
        }
        _ => Ok(Item::Value(to_inline(value)?)),
    }
}

fn to_table(entries: &[(String, Value)]) -> Result<Table, String> {
    let mut table = Table::new();
    for (key, item) in entries {
        table.insert(key, to_item(item)?);
    }
    Ok(table)
}

fn to_inline(value: &Value) -> Result<toml_edit::Value, String> {
    match value {
        Value::Null => Err("TOML has no null type".to_string()),
        Value::Bool(b) => Ok(toml_edit::Value::Boolean(Formatted::new(*b))),
        Value::Integer(n) => {
            let i = n
                .to_i64()
                .ok_or_else(|| format!("Integer {} too large for TOML (i64)", n))?;
            Ok(toml_edit::Value::Integer(Formatted::new(i)))
        }
        Value::Float(f) => Ok(toml_edit::Value::Float(Formatted::new(*f))),
        Value::String(s) => Ok(toml_edit::Value::String(Formatted::new(s.clone()))),
        Value::Array(items) => {
            let mut array = Array::new();
            for item in items {
                array.push(to_inline(item)?);
            }
            Ok(toml_edit::Value::Array(array))
        }
        Value::Object(entries) => {
            let mut table = InlineTable::new();
            for (key, item) in entries {
                table.insert(key.as_str(), to_inline(item)?);
            }
            Ok(toml_edit::Value::InlineTable(table))
        }
    }
}

fn is_object(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}
