//! Events - 推送帧发布

mod publisher;

pub use publisher::EventPublisher;
