pub mod color;
pub mod plot;
pub mod presets;
pub mod render_request;
pub mod sampler;
pub mod transform;
