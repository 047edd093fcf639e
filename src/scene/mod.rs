pub mod element;
pub mod group;
pub mod layout;
pub mod scene;
pub mod text;
