use serde::Deserialize;
use std::collections::BTreeMap;
use strum::{
    Display,
    EnumIter,
    EnumString,
};

/// Storage engine dialect spoken by a volume controller.
#[derive(Debug, Default, Clone, Copy, Display, EnumIter, EnumString, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CasType {
    #[default]
    Jiva,
}

/// One monitored volume: where its controller lives and how to talk to it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VolumeConfig {
    pub controller_url: url::Url,
    #[serde(default)]
    pub cas_type: CasType,
    /// Constant labels attached to every metric of this volume.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl VolumeConfig {
    pub fn new(controller_url: url::Url, cas_type: CasType) -> Self {
        Self {
            controller_url,
            cas_type,
            labels: BTreeMap::new(),
        }
    }
}
