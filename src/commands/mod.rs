// Command handlers module
pub mod run;
pub mod specs;
pub mod version;

// Re-exports for cleaner imports
pub use run::execute as run;
pub use specs::execute as specs;
pub use version::execute as version;
