//! Basic file attributes as a JSON map.
//!
//! Attribute selectors follow the `[view:]name[,name...]` form script
//! engines pass through, e.g. `"*"`, `"basic:*"` or `"size,isDirectory"`.
//! Only the `basic` view exists.

use std::fs::Metadata;
use std::io;
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Names of every supported basic attribute.
pub const BASIC_ATTRIBUTES: &[&str] = &[
    "size",
    "lastModifiedTime",
    "lastAccessTime",
    "creationTime",
    "isRegularFile",
    "isDirectory",
    "isSymbolicLink",
    "isOther",
];

/// Collect the attributes named by `selector` from `meta`.
///
/// Timestamps are RFC 3339 strings in UTC; ones the platform does not
/// record are `null`.
pub fn select(meta: &Metadata, selector: &str) -> io::Result<Map<String, Value>> {
    let names = match selector.split_once(':') {
        Some(("basic", names)) => names,
        Some((view, _)) => {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("attribute view '{view}' not available"),
            ));
        }
        None => selector,
    };

    let mut map = Map::new();
    for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if name == "*" {
            for &attr in BASIC_ATTRIBUTES {
                map.insert(attr.to_string(), attribute(meta, attr));
            }
        } else if BASIC_ATTRIBUTES.iter().any(|attr| *attr == name) {
            map.insert(name.to_string(), attribute(meta, name));
        } else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{name}' not recognized"),
            ));
        }
    }
    Ok(map)
}

fn attribute(meta: &Metadata, name: &str) -> Value {
    let kind = meta.file_type();
    match name {
        "size" => Value::from(meta.len()),
        "lastModifiedTime" => timestamp(meta.modified()),
        "lastAccessTime" => timestamp(meta.accessed()),
        "creationTime" => timestamp(meta.created()),
        "isRegularFile" => Value::Bool(kind.is_file()),
        "isDirectory" => Value::Bool(kind.is_dir()),
        "isSymbolicLink" => Value::Bool(kind.is_symlink()),
        "isOther" => Value::Bool(!kind.is_file() && !kind.is_dir() && !kind.is_symlink()),
        _ => Value::Null,
    }
}

fn timestamp(time: io::Result<SystemTime>) -> Value {
    time.map(|t| {
        let dt: DateTime<Utc> = t.into();
        Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    })
    .unwrap_or(Value::Null)
}
