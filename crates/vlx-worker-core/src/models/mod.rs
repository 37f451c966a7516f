//! Data models exchanged between the worker and its host.
//!
//! - `Request`, `Response`: the network/cache payloads the interceptor handles
//! - `ReleaseMetadata`, `ReleaseAsset`: the GitHub latest-release document
//! - `ClientMessage`: the message posted to open pages
//! - Notification types: `NotificationOptions`, `NotificationAction`, `NotificationClick`

pub mod message;
pub mod notification;
pub mod release;
pub mod request;
pub mod response;

pub use message::ClientMessage;
pub use notification::{
    NotificationAction, NotificationClick, NotificationData, NotificationOptions, ACTION_LATER,
    ACTION_UPDATE,
};
pub use release::{ReleaseAsset, ReleaseMetadata};
pub use request::{Request, RequestMode};
pub use response::{Response, ResponseType};
