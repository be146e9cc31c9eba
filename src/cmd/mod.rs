pub mod align;
pub mod verify;
