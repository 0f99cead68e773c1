//! Engine configuration.

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Viewport width the engine starts at, before the first resize.
    /// Default: **1440**.
    pub initial_width: f32,

    /// Fire every `load` connection once when the engine is built (and again
    /// after [`Engine::reset`](crate::engine::Engine::reset)). Default: **true**.
    pub fire_load_connections: bool,

    /// When a new snapshot replaces the current one, keep variants whose
    /// dynamic node and target both still exist. When **false**, every node
    /// returns to base state on refresh. Default: **true**.
    pub keep_variants_on_refresh: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_width: 1440.0,
            fire_load_connections: true,
            keep_variants_on_refresh: true,
        }
    }
}
