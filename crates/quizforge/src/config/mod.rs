pub mod loader;
pub mod schema;

pub use loader::{default_bank_path, load_or_default, load_settings, load_settings_from_str, settings_path};
pub use schema::{validate_settings, BankSettings, GenerationSettings, QualitySettings, Settings};
