pub mod inter_relocate;
pub mod r#move;
pub mod relocate;
pub mod two_opt;
