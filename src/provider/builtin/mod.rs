mod config_file;
mod file;
mod process;
mod winreg;

use super::ActionProvider;

/// Returns every built-in provider.
pub fn all_providers() -> Vec<Box<dyn ActionProvider>> {
    vec![
        Box::new(file::DeleteProvider),
        Box::new(file::ShredProvider),
        Box::new(file::TruncateProvider),
        Box::new(file::DeepScanProvider),
        Box::new(config_file::IniProvider),
        Box::new(config_file::JsonProvider),
        Box::new(winreg::WinregProvider),
        Box::new(process::ProcessProvider),
        Box::new(process::PackageManagerProvider),
    ]
}
