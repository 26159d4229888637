/// Shared configuration for render-on-demand scheduling

/// Minimum interval between two presented frames (seconds). Render requests
/// arriving inside the interval coalesce into one render at its end.
pub const MIN_RENDER_INTERVAL: f64 = 0.080;
