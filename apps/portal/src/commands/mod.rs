pub mod api;
pub mod navigation;
pub mod settings;
