/// Renderer module - backend-agnostic renderer contract

// Module declarations
pub mod renderer;
pub mod unimplemented_renderer;
#[cfg(test)]
pub mod mock_renderer;

// Re-export everything from renderer.rs
pub use renderer::*;
pub use unimplemented_renderer::UnimplementedRenderer;

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
