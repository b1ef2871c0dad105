pub mod attachment;
pub mod cache;
pub mod conversation;
pub mod event;
pub mod integration;
pub mod message;
pub mod messaging;
pub mod user;
pub mod util;

pub use event::service::Subscription;
pub use messaging::MessagingService;
