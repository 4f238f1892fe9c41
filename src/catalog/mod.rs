/// Action Catalog Layer
///
/// Read-only registry of installed apps, their actions/conditions/transforms, and the
/// configured devices. Lookups are by name and fail explicitly when an entry is missing.

// Catalog type definitions (AppApi, ActionApi, ...)
pub mod types;

// Name-based lookups over a catalog snapshot
pub mod lookup;

// Hot-reload registry using ArcSwap
pub mod registry;

pub use lookup::Catalog;
pub use registry::CatalogRegistry;
pub use types::{
    ActionApi, AppApi, ConditionApi, Device, DeviceApi, ParameterApi, ParameterSchema, ReturnApi,
    TransformApi,
};
