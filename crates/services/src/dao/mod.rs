pub mod base;
pub mod group;
pub mod message;
pub mod status;
pub mod user;

pub use base::BaseDao;
