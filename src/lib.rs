pub mod backend;
pub mod command;
pub mod config;
pub mod loader;
pub mod model;
pub mod overlay;
pub mod persist;
pub mod sanitize;
pub mod search;

pub use backend::{
    AssessmentSummary, BackendError, CourseSummary, PortalBackend, Shell, TtlCache, UserDataStore,
    VolatileCache,
};
pub use command::CommandRegistry;
pub use config::SearchConfig;
pub use loader::LoaderUpdate;
pub use model::{ItemKind, SearchCategory, SearchItem, SearchMode};
pub use overlay::{CursorMove, DisplayList, OverlayEvent, OverlaySession, binding_legend};
pub use persist::UserData;
pub use search::{Catalog, SIDEBAR_ACTION_ID};
