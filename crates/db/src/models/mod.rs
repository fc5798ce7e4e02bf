pub mod group;
pub mod kicked_user;
pub mod message;
pub mod muted_users;
pub mod participant;
pub mod presence;
pub mod status;
pub mod user;

pub use group::{Group, GroupAdmin, GroupContainer, GroupControls, GroupSettings, GroupTime};
pub use kicked_user::KickedUser;
pub use message::GroupMessage;
pub use muted_users::MutedUsers;
pub use participant::{Participant, Task};
pub use presence::{PresenceRecord, PresenceState};
pub use status::StatusDocument;
pub use user::UserProfile;
