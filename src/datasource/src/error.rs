use common::ObjectType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("query failed: {0}")]
    Query(String),
    #[error("no entity dao registered for object type '{0}'")]
    UnregisteredType(ObjectType),
}
