pub mod formatter;
pub mod renderer;

pub use renderer::render_markdown;
