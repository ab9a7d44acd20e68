use std::path::PathBuf;

use rfd::AsyncFileDialog;

/// File types offered when importing a product catalog.
pub const CATALOG_FILTERS: &[(&str, &[&str])] = &[("CSV", &["csv"]), ("Text", &["txt"])];

/// Opens an async file picker starting in `location`.
///
/// Each filter is a `(name, extensions)` pair, e.g. `("CSV", ["csv"])`.
pub async fn pick_file(
    location: PathBuf,
    filters: Vec<(String, Vec<String>)>,
) -> Option<PathBuf> {
    let mut dialog = AsyncFileDialog::new().set_directory(&location);

    for (name, extensions) in &filters {
        dialog = dialog.add_filter(name, extensions);
    }

    let file = dialog.pick_file().await?;
    Some(file.path().to_path_buf())
}

/// Asks for a product catalog CSV, starting in the working directory.
pub async fn pick_catalog_file() -> Option<PathBuf> {
    let location = std::env::current_dir().unwrap_or_default();
    pick_file(location, owned_filters(CATALOG_FILTERS)).await
}

/// Owned copy of borrowed filter definitions, for moving into `async` blocks.
pub fn owned_filters(filters: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
    filters
        .iter()
        .map(|(name, exts)| {
            (
                name.to_string(),
                exts.iter().map(|e| e.to_string()).collect(),
            )
        })
        .collect()
}
