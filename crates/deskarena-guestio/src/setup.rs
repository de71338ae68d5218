//! Setup directive dispatch: `task.config[]` and `evaluator.postconfig[]`
//! entries each name a `type` that is resolved against a static registry of
//! setters, each forwarding to one `/setup/*` guest primitive. Lives in
//! `deskarena-guestio` (not `engine` or `evaluators`) because both of those
//! crates need it and putting it in either would create a cycle.
//!
//! Grounded on the `/setup/*` routes in `vm/setup/server/main.py` and on
//! `agtrace-providers::registry`'s static-table dispatch-by-tag pattern.

use crate::client::GuestClient;
use crate::error::{Error, Result};
use deskarena_types::task::ConfigDirective;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

type SetterFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// One `type` value a config directive can carry, dispatching to a single
/// `/setup/*` primitive on the guest.
pub trait Setter: Send + Sync {
    fn tag(&self) -> &'static str;
    fn apply<'a>(&'a self, client: &'a GuestClient, payload: &'a Value) -> SetterFuture<'a>;
}

macro_rules! forwarding_setter {
    ($name:ident, $tag:literal, $primitive:literal) => {
        struct $name;
        impl Setter for $name {
            fn tag(&self) -> &'static str {
                $tag
            }
            fn apply<'a>(&'a self, client: &'a GuestClient, payload: &'a Value) -> SetterFuture<'a> {
                Box::pin(async move {
                    client.setup($primitive, payload.clone()).await?;
                    Ok(())
                })
            }
        }
    };
}

forwarding_setter!(CreateFolderSetter, "create_folder", "create_folder");
forwarding_setter!(CreateFileSetter, "create_file", "create_file");
forwarding_setter!(UploadSetter, "upload", "upload");
forwarding_setter!(DownloadFileSetter, "download_file", "download_file");
forwarding_setter!(RecycleSetter, "recycle", "recycle");
forwarding_setter!(LaunchSetter, "launch", "launch");
forwarding_setter!(ActivateWindowSetter, "activate_window", "activate_window");
forwarding_setter!(CloseWindowSetter, "close_window", "close_window");
forwarding_setter!(CloseAllSetter, "close_all", "close_all");
forwarding_setter!(ChangeWallpaperSetter, "change_wallpaper", "change_wallpaper");
forwarding_setter!(OpenFileSetter, "open_file", "open_file");
forwarding_setter!(ClearTaskFilesSetter, "clear_task_files", "clear_task_files");

const SETTERS: &[&dyn Setter] = &[
    &CreateFolderSetter,
    &CreateFileSetter,
    &UploadSetter,
    &DownloadFileSetter,
    &RecycleSetter,
    &LaunchSetter,
    &ActivateWindowSetter,
    &CloseWindowSetter,
    &CloseAllSetter,
    &ChangeWallpaperSetter,
    &OpenFileSetter,
    &ClearTaskFilesSetter,
];

fn resolve(tag: &str) -> Result<&'static dyn Setter> {
    SETTERS
        .iter()
        .find(|s| s.tag() == tag)
        .copied()
        .ok_or_else(|| Error::UnknownKey(format!("unknown setter type: {tag}")))
}

/// Applies a single config directive by dispatching its `type` to the
/// matching setter (§4.4 SETUP transition).
pub async fn apply_directive(client: &GuestClient, directive: &ConfigDirective) -> Result<()> {
    let setter = resolve(&directive.kind)?;
    setter.apply(client, &directive.payload).await
}

/// Applies an entire `task.config[]` list in order, stopping at the first
/// failure.
pub async fn apply_all(client: &GuestClient, directives: &[ConfigDirective]) -> Result<()> {
    for directive in directives {
        apply_directive(client, directive).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_finds_known_setter() {
        let setter = resolve("launch").unwrap();
        assert_eq!(setter.tag(), "launch");
    }

    #[test]
    fn resolve_rejects_unknown_tag() {
        let err = resolve("teleport_user").unwrap_err();
        assert!(matches!(err, Error::UnknownKey(_)));
    }

    #[test]
    fn every_setter_tag_is_unique() {
        let mut tags: Vec<&str> = SETTERS.iter().map(|s| s.tag()).collect();
        tags.sort_unstable();
        let mut deduped = tags.clone();
        deduped.dedup();
        assert_eq!(tags.len(), deduped.len());
    }
}
