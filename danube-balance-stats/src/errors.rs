use thiserror::Error;

use crate::cluster::BrokerId;
use crate::resource::Resource;

pub type Result<T> = std::result::Result<T, StatsError>;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("broker {0} not found in the cluster model")]
    UnknownBroker(BrokerId),

    #[error("broker {0} is already part of the cluster model")]
    DuplicateBroker(BrokerId),

    #[error("broker {broker} has no capacity for resource {resource}")]
    MissingCapacity { broker: BrokerId, resource: Resource },

    #[error("replica of {topic}-{partition} on broker {broker} not found")]
    UnknownReplica {
        topic: String,
        partition: u32,
        broker: BrokerId,
    },

    #[error("Invalid cluster model: {0}")]
    InvalidModel(String),

    #[error("Invalid balancing constraint: {0}")]
    InvalidConstraint(String),

    #[error("cluster has no alive brokers")]
    NoAliveBrokers,
}
