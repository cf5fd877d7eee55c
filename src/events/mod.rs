pub mod interaction;
pub mod member;
pub mod message;

pub use interaction::handle_component;
pub use member::handle_member_add;
pub use message::handle_message;
