use directories::ProjectDirs;
use std::path::PathBuf;

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("id", "yasashii", "YasashiiNihongo") {
        pd.data_dir().to_path_buf()
    } else {
        // Fallback: current dir
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

pub fn store_dirs(root: &std::path::Path) -> (PathBuf, PathBuf) {
    (root.join("store"), root.join("backups"))
}

pub fn config_file(root: &std::path::Path) -> PathBuf {
    root.join("config.toml")
}
