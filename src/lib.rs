// App shell: scene assembly, asset plumbing, and the frame loop live here.
pub mod assets;
pub mod audio;
pub mod config;
pub mod gfx;
pub mod platform_winit;
pub mod scene;
