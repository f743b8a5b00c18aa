//! Job variant classification.

/// Derives variant labels (platform, network, upgrade, ...) from a job name.
pub trait VariantManager: Send + Sync {
    /// Sorted, de-duplicated labels for `job_name`.
    fn identify_variants(&self, job_name: &str) -> Vec<String>;
}

/// Keyword table applied to the lower-cased job name.
const KEYWORDS: &[(&str, &str)] = &[
    ("-aws", "aws"),
    ("-azure", "azure"),
    ("-gcp", "gcp"),
    ("-metal", "metal"),
    ("-vsphere", "vsphere"),
    ("-openstack", "openstack"),
    ("-ovirt", "ovirt"),
    ("-libvirt", "libvirt"),
    ("-ovn", "ovn"),
    ("-sdn", "sdn"),
    ("upgrade", "upgrade"),
    ("-serial", "serial"),
    ("techpreview", "techpreview"),
    ("single-node", "single-node"),
    ("-proxy", "proxy"),
    ("-fips", "fips"),
    ("-arm64", "arm64"),
    ("-ppc64le", "ppc64le"),
    ("-s390x", "s390x"),
];

/// Substring-based [`VariantManager`].
#[derive(Debug, Clone, Default)]
pub struct KeywordVariantManager;

impl VariantManager for KeywordVariantManager {
    fn identify_variants(&self, job_name: &str) -> Vec<String> {
        let name = job_name.to_lowercase();
        let mut variants: Vec<String> = KEYWORDS
            .iter()
            .filter(|(needle, _)| name.contains(needle))
            .map(|(_, label)| label.to_string())
            .collect();
        variants.sort();
        variants.dedup();
        variants
    }
}
