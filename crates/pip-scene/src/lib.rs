//! AR scene for Product in Perspective
//!
//! Places a product's 3D model on a detected real-world surface:
//! - [`mode`]: the pure Inactive/Placing/Viewing state machine
//! - [`scene`]: the component binding that machine to the platform
//! - [`renderer`]: adapter trait onto the 3D scene graph
//! - [`storage`]: model reference to URL resolution
//!
//! # Example
//!
//! ```rust,ignore
//! use pip_scene::{ArScene, ArSceneConfig, SceneEvent};
//!
//! let mut scene = ArScene::new(ArSceneConfig::default(), platform, renderer, storage, texts);
//! let mut events = scene.subscribe();
//!
//! scene.select(product).await?;
//! scene.handle_signal(signal).await; // for every platform signal
//! scene.on_frame(&frame);            // for every render frame
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod mode;
pub mod renderer;
pub mod scene;
pub mod storage;

pub use config::ArSceneConfig;
pub use error::SceneError;
pub use mode::{transition, SceneCommand, SceneInput, SceneMode, Transition};
pub use renderer::{RenderCommand, SceneRenderer};
pub use scene::{ArScene, SceneEvent, EXIT_BUTTON};
pub use storage::{ModelStorage, UrlModelStorage};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the scene
    pub use crate::{ArScene, ArSceneConfig, SceneError, SceneEvent, SceneMode};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
