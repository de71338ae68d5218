//! Concrete getters, each grounded on one `get_<tag>` function in the
//! original's `getters/` package (§4.5.2).

use crate::error::{Error, Result};
use crate::traits::{Getter, GetterFuture, GetterValue};
use deskarena_guestio::GuestClient;
use serde_json::Value;

fn arg_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::NotFound(format!("missing required arg '{key}'")))
}

pub struct RegistryGetter;
impl Getter for RegistryGetter {
    fn tag(&self) -> &'static str {
        "registry"
    }
    fn get<'a>(&'a self, client: &'a GuestClient, args: &'a Value) -> GetterFuture<'a> {
        Box::pin(async move {
            let key = arg_str(args, "key")?;
            match client.registry_value(key).await? {
                Some(value) => Ok(GetterValue::Text(value)),
                None => Ok(GetterValue::Null),
            }
        })
    }
}

pub struct FileExistsGetter;
impl Getter for FileExistsGetter {
    fn tag(&self) -> &'static str {
        "file_exists"
    }
    fn get<'a>(&'a self, client: &'a GuestClient, args: &'a Value) -> GetterFuture<'a> {
        Box::pin(async move {
            let path = arg_str(args, "path")?;
            Ok(GetterValue::Bool(client.file_exists(path).await?))
        })
    }
}

pub struct FileContentsGetter;
impl Getter for FileContentsGetter {
    fn tag(&self) -> &'static str {
        "file_contents"
    }
    fn get<'a>(&'a self, client: &'a GuestClient, args: &'a Value) -> GetterFuture<'a> {
        Box::pin(async move {
            let path = arg_str(args, "path")?;
            if !client.file_exists(path).await? {
                return Err(Error::NotFound(path.to_string()));
            }
            let bytes = client.file(path).await?;
            let text = String::from_utf8_lossy(&bytes).into_owned();
            Ok(GetterValue::Text(text))
        })
    }
}

pub struct JsonPreferenceGetter;
impl Getter for JsonPreferenceGetter {
    fn tag(&self) -> &'static str {
        "json_preference"
    }
    fn get<'a>(&'a self, client: &'a GuestClient, args: &'a Value) -> GetterFuture<'a> {
        Box::pin(async move {
            let path = arg_str(args, "path")?;
            if !client.file_exists(path).await? {
                return Err(Error::NotFound(path.to_string()));
            }
            let bytes = client.file(path).await?;
            let value: Value = serde_json::from_slice(&bytes)
                .map_err(|e| Error::NotFound(format!("{path} is not valid JSON: {e}")))?;
            Ok(GetterValue::Json(value))
        })
    }
}

pub struct WorldClockGetter;
impl Getter for WorldClockGetter {
    fn tag(&self) -> &'static str {
        "world_clock"
    }
    fn get<'a>(&'a self, client: &'a GuestClient, args: &'a Value) -> GetterFuture<'a> {
        Box::pin(async move {
            let city = arg_str(args, "city")?;
            let country = arg_str(args, "country")?;
            match client.check_world_clock_exists(city, country).await? {
                Some(label) => Ok(GetterValue::Text(label)),
                None => Ok(GetterValue::Null),
            }
        })
    }
}

pub struct AccessibilityTreeGetter;
impl Getter for AccessibilityTreeGetter {
    fn tag(&self) -> &'static str {
        "accessibility_tree"
    }
    fn get<'a>(&'a self, client: &'a GuestClient, args: &'a Value) -> GetterFuture<'a> {
        Box::pin(async move {
            let backend = args.get("backend").and_then(Value::as_str);
            match client.accessibility_tree(backend).await? {
                Some(xml) => Ok(GetterValue::Text(xml)),
                None => Ok(GetterValue::Null),
            }
        })
    }
}

pub struct DirectoryListingGetter;
impl Getter for DirectoryListingGetter {
    fn tag(&self) -> &'static str {
        "directory_listing"
    }
    fn get<'a>(&'a self, client: &'a GuestClient, args: &'a Value) -> GetterFuture<'a> {
        Box::pin(async move {
            let path = arg_str(args, "path")?;
            if !client.folder_exists(path).await? {
                return Err(Error::NotFound(path.to_string()));
            }
            let entries = client.list_directory(path).await?;
            Ok(GetterValue::List(entries))
        })
    }
}

/// A constant baked into the task JSON itself rather than read off the
/// guest -- the `expected` side of an `eq`-style metric when there is no
/// natural getter to pair against (e.g. "the registry value equals the
/// literal string 42").
pub struct LiteralGetter;
impl Getter for LiteralGetter {
    fn tag(&self) -> &'static str {
        "literal"
    }
    fn get<'a>(&'a self, _client: &'a GuestClient, args: &'a Value) -> GetterFuture<'a> {
        Box::pin(async move {
            let value = args.get("value").cloned().unwrap_or(Value::Null);
            Ok(match value {
                Value::Null => GetterValue::Null,
                Value::Bool(b) => GetterValue::Bool(b),
                Value::String(s) => GetterValue::Text(s),
                Value::Array(items) => {
                    GetterValue::List(items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                }
                other => GetterValue::Json(other),
            })
        })
    }
}

pub fn all() -> Vec<&'static dyn Getter> {
    vec![
        &RegistryGetter,
        &FileExistsGetter,
        &FileContentsGetter,
        &JsonPreferenceGetter,
        &WorldClockGetter,
        &LiteralGetter,
        &AccessibilityTreeGetter,
        &DirectoryListingGetter,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_stable() {
        let tags: Vec<&str> = all().iter().map(|g| g.tag()).collect();
        assert!(tags.contains(&"registry"));
        assert!(tags.contains(&"directory_listing"));
    }

    #[tokio::test]
    async fn literal_getter_passes_through_string_values() {
        let client = GuestClient::new("127.0.0.1");
        let value = LiteralGetter.get(&client, &serde_json::json!({"value": "42"})).await.unwrap();
        assert_eq!(value, GetterValue::Text("42".to_string()));
    }
}
