pub mod config;
pub mod downloader;
pub mod logging;
pub mod session;

#[cfg(feature = "desktop")]
mod commands;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    logging::init();
    let state = commands::AppState::new(config::AppConfig::from_env());

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(state)
        .invoke_handler(tauri::generate_handler![
            commands::analyze_url,
            commands::download_selection,
            commands::export_file,
            commands::package_archive,
            commands::open_staging_dir,
            commands::get_diagnostics,
            commands::reset_session,
            commands::get_tools_status,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
