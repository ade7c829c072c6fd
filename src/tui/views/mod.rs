pub mod history;
pub mod login;
pub mod modals;
