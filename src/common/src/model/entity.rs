use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::{EntityId, TenantId};
use crate::object_type::ObjectType;

/// Implemented by every entity model that belongs to a tenant and can be the
/// root of a sub-export cycle.
pub trait TenantEntity {
    const OBJECT_TYPE: ObjectType;

    fn id(&self) -> Uuid;

    fn entity_id(&self) -> EntityId {
        EntityId::new(Self::OBJECT_TYPE, self.id())
    }
}

macro_rules! tenant_entity {
    ($entity:ty, $object_type:expr) => {
        impl TenantEntity for $entity {
            const OBJECT_TYPE: ObjectType = $object_type;

            fn id(&self) -> Uuid {
                self.id
            }
        }
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub title: String,
    pub region: String,
    pub email: String,
    pub created_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub title: String,
    pub email: String,
    pub created_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub email: String,
    pub authority: String,
    pub created_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: String,
    pub default: bool,
    pub created_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub name: String,
    pub device_profile_id: Uuid,
    pub label: String,
    pub created_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetProfile {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: String,
    pub default: bool,
    pub created_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub name: String,
    pub asset_profile_id: Uuid,
    pub label: String,
    pub created_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub title: String,
    pub configuration: serde_json::Value,
    pub created_time: i64,
}

tenant_entity!(Customer, ObjectType::Customer);
tenant_entity!(User, ObjectType::User);
tenant_entity!(DeviceProfile, ObjectType::DeviceProfile);
tenant_entity!(Device, ObjectType::Device);
tenant_entity!(AssetProfile, ObjectType::AssetProfile);
tenant_entity!(Asset, ObjectType::Asset);
tenant_entity!(Dashboard, ObjectType::Dashboard);
