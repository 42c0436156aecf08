// ── Site mapper ──
//
// Controller sites are matched to NetBox sites by name, optionally
// through a mapping table layered from inline config and a mapping file.
// Inline entries always win; unmapped names pass through unchanged.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::model::InventorySite;

/// NetBox sites indexed by name.
pub type SiteIndex = HashMap<String, InventorySite>;

/// Ordered controller-site-name → NetBox-site-name table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteMapping {
    entries: IndexMap<String, String>,
    file_enabled: bool,
}

impl SiteMapping {
    pub fn from_entries(entries: IndexMap<String, String>) -> Self {
        Self {
            entries,
            file_enabled: false,
        }
    }

    /// Layer a mapping file under inline config entries.
    ///
    /// File entries only fill keys the config does not define. Passing
    /// `Some` (even empty) marks file-based mapping as enabled, which
    /// changes the hint logged for unmatched sites.
    pub fn layered(
        config: IndexMap<String, String>,
        file: Option<IndexMap<String, String>>,
    ) -> Self {
        let file_enabled = file.is_some();
        let mut entries = config;
        for (key, value) in file.unwrap_or_default() {
            entries.entry(key).or_insert(value);
        }
        debug!(entries = entries.len(), file_enabled, "final site mapping");
        Self {
            entries,
            file_enabled,
        }
    }

    /// Mapped NetBox name, or `name` itself when unmapped.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        match self.entries.get(name) {
            Some(mapped) => {
                debug!("Mapped UniFi site '{name}' to NetBox site '{mapped}'");
                mapped
            }
            None => name,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn file_enabled(&self) -> bool {
        self.file_enabled
    }
}

/// Index NetBox sites by name. Later duplicates replace earlier ones.
pub fn index_sites(sites: impl IntoIterator<Item = InventorySite>) -> SiteIndex {
    sites
        .into_iter()
        .map(|site| (site.name.clone(), site))
        .collect()
}

/// Resolve a controller site through the mapping and look it up.
///
/// `None` means "skip this site"; the reason is logged with a hint on how
/// to add a mapping.
pub fn match_site<'a>(
    controller_site: &str,
    sites: &'a SiteIndex,
    mapping: &SiteMapping,
) -> Option<&'a InventorySite> {
    let target = mapping.resolve(controller_site);
    debug!("Mapping UniFi site: \"{controller_site}\" -> \"{target}\"");

    let found = sites.get(target);
    match found {
        Some(site) => {
            debug!("Matched UniFi site \"{controller_site}\" to NetBox site \"{}\"", site.name);
        }
        None if mapping.file_enabled() => {
            debug!(
                "No match found for UniFi site \"{controller_site}\". Add mapping in config.yaml or site_mapping.yaml."
            );
        }
        None => {
            debug!(
                "No match found for UniFi site \"{controller_site}\". Enable site mapping in config.yaml if needed."
            );
        }
    }
    found
}
