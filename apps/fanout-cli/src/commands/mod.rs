pub mod networks;
pub mod send;
