pub mod navigation;
pub mod templates;
pub mod views;

pub use navigation::NavigationComponent;
pub use templates::TemplateComponent;
