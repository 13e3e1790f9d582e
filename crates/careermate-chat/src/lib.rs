pub mod controller;
pub mod conversation;
pub mod location;
pub mod stream;

pub use controller::{ChatController, Route, SendOutcome};
pub use conversation::{Conversation, ConversationEvent};
pub use location::{
    acquire_location, IpLocation, LocationError, LocationProvider, LocationState, NoLocation,
    StaticLocation,
};
