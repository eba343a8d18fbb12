pub mod login;
pub mod menu;
pub mod options;
pub mod resource;
pub mod status;
