pub mod patcher;
pub mod project_scanner;
pub mod update;

pub use patcher::PatchAgent;
pub use project_scanner::ProjectScannerAgent;
pub use update::{StrategyRegistry, UpdateRun};
