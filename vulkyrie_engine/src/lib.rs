/*!
# Vulkyrie Engine

Core traits and types for the Vulkyrie rendering engine.

This crate is backend-agnostic. Backend implementations (Vulkan today,
OpenGL and DirectX as placeholders) implement the [`vulkyrie::Renderer`]
trait and are driven by the [`vulkyrie::ApplicationManager`].

## Architecture

- **Renderer**: frame contract (initialize, resize, begin/end frame, shutdown)
- **Application**: client hooks (initialize, update, render, resize)
- **ApplicationManager**: owns platform, renderer and application, runs frames
- **Platform**: time source and sleeping, injected explicitly
- **Engine**: global logging sink behind the `engine_*!` macros
*/

// Internal modules
mod error;
mod engine;
mod clock;
mod platform;
mod application;
pub mod log;
pub mod renderer;

#[cfg(test)]
mod mock_platform;

// Main vulkyrie namespace module
pub mod vulkyrie {
    // Error types
    pub use crate::error::{Error, Result, StatusCode};

    // Logging front
    pub use crate::engine::Engine;

    // Platform and timing
    pub use crate::platform::Platform;
    pub use crate::clock::Clock;

    // Application driver
    pub use crate::application::{Application, ApplicationConfig, ApplicationManager};

    // Renderer trait
    pub use crate::renderer::Renderer;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Render sub-module with all renderer types
    pub mod render {
        pub use crate::renderer::*;
    }
}
