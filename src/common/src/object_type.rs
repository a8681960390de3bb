use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of exported record categories. The declared order is the
/// traversal order of the export engine and must stay stable: storage paths
/// and archived file names are derived from the snake_case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Tenant,
    Customer,
    User,
    DeviceProfile,
    Device,
    AssetProfile,
    Asset,
    Dashboard,
    Relation,
    AttributeKv,
    LatestTsKv,
    Event,
    AuditLog,
}

impl ObjectType {
    /// All variants in declared (traversal) order.
    pub const VALUES: [ObjectType; 13] = [
        ObjectType::Tenant,
        ObjectType::Customer,
        ObjectType::User,
        ObjectType::DeviceProfile,
        ObjectType::Device,
        ObjectType::AssetProfile,
        ObjectType::Asset,
        ObjectType::Dashboard,
        ObjectType::Relation,
        ObjectType::AttributeKv,
        ObjectType::LatestTsKv,
        ObjectType::Event,
        ObjectType::AuditLog,
    ];

    pub const COUNT: usize = Self::VALUES.len();

    /// Stable snake_case name, matching the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectType::Tenant => "tenant",
            ObjectType::Customer => "customer",
            ObjectType::User => "user",
            ObjectType::DeviceProfile => "device_profile",
            ObjectType::Device => "device",
            ObjectType::AssetProfile => "asset_profile",
            ObjectType::Asset => "asset",
            ObjectType::Dashboard => "dashboard",
            ObjectType::Relation => "relation",
            ObjectType::AttributeKv => "attribute_kv",
            ObjectType::LatestTsKv => "latest_ts_kv",
            ObjectType::Event => "event",
            ObjectType::AuditLog => "audit_log",
        }
    }

    /// Position in the declared order, used to index per-type counters.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
