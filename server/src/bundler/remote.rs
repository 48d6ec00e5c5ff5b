use crate::import_map::ImportMap;
use rolldown::plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};
use rolldown_common::{ModuleType, ResolvedExternal};
use std::borrow::Cow;
use std::sync::Arc;

const REMOTE_ENTRY_PREFIX: &str = "\0kiln-remote-entry:";

/// Resolves specifiers the import map sends to `http(s)` URLs.
///
/// Imports of such specifiers become external imports of the URL itself,
/// so the emitted code fetches the module the map names. An entry point
/// mapped to a URL is bundled as a small module re-exporting the URL,
/// which keeps its named output file.
#[derive(Debug, Clone)]
pub struct RemoteImportPlugin {
    import_map: Arc<ImportMap>,
}

impl RemoteImportPlugin {
    pub fn new(import_map: Arc<ImportMap>) -> Self {
        Self { import_map }
    }
}

impl Plugin for RemoteImportPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln-remote-imports".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let target = self.import_map.remote_target(args.specifier);
        let is_entry = args.is_entry;

        async move {
            let Some(url) = target else {
                return Ok(None);
            };

            if is_entry {
                return Ok(Some(HookResolveIdOutput {
                    id: format!("{REMOTE_ENTRY_PREFIX}{url}").into(),
                    external: Some(ResolvedExternal::Bool(false)),
                    ..Default::default()
                }));
            }

            Ok(Some(HookResolveIdOutput {
                id: url.into(),
                external: Some(ResolvedExternal::Bool(true)),
                normalize_external_id: Some(false),
                ..Default::default()
            }))
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let url = args.id.strip_prefix(REMOTE_ENTRY_PREFIX).map(str::to_string);

        async move {
            Ok(url.map(|url| HookLoadOutput {
                code: remote_entry_source(&url).into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}

fn remote_entry_source(url: &str) -> String {
    format!("export * from {url:?};\nexport {{ default }} from {url:?};\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_entries_reexport_the_url() {
        let source = remote_entry_source("https://esm.sh/react@18");

        assert_eq!(
            source,
            "export * from \"https://esm.sh/react@18\";\nexport { default } from \"https://esm.sh/react@18\";\n"
        );
    }
}
