//! QrScan - Tauri Application
//!
//! Turns a link into a QR code card via a remote image API and keeps a local
//! history of generated links.

#[macro_use]
pub mod logger;

#[cfg(feature = "shell")]
mod commands;
pub mod error;
pub mod history_manager;
pub mod nav_items;
pub mod qr_service;
pub mod session;
pub mod settings;
pub mod share;
pub mod storage;
pub mod view_state;

#[cfg(feature = "shell")]
use commands::*;

#[cfg(feature = "shell")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri_plugin_deep_link::DeepLinkExt;

    logger::init_tracing();

    let app_settings = settings::load_settings();
    let storage = storage::FileStore::new(settings::get_settings_dir());
    let qr_session = session::QrSession::new(app_settings, storage);

    tauri::Builder::default()
        .plugin(tauri_plugin_clipboard_manager::init())
        .plugin(tauri_plugin_deep_link::init())
        .plugin(tauri_plugin_window_state::Builder::default().build())
        .manage(SessionState::new(qr_session))
        .invoke_handler(tauri::generate_handler![
            get_settings,
            save_settings,
            // View
            get_view_state,
            set_url,
            generate,
            reset_view,
            copy_link,
            download_qr,
            // History
            open_history,
            close_history,
            get_history,
            select_history_entry,
            delete_history_entry,
            clear_history,
            // Navigation & diagnostics
            get_nav_items,
            get_diagnostics,
        ])
        .setup(|app| {
            // Share intents arrive as qrscan://share?text=... deep links
            let app_handle = app.handle().clone();
            app.deep_link().on_open_url(move |event| {
                for url in event.urls() {
                    let handle = app_handle.clone();
                    let link = url.to_string();
                    tauri::async_runtime::spawn(async move {
                        handle_share_link(handle, link).await;
                    });
                }
            });

            // Cold start from a share intent
            match app.deep_link().get_current() {
                Ok(Some(urls)) => {
                    for url in urls {
                        let handle = app.handle().clone();
                        let link = url.to_string();
                        tauri::async_runtime::spawn(async move {
                            handle_share_link(handle, link).await;
                        });
                    }
                }
                Ok(None) => {}
                Err(e) => app_warn!("Failed to read startup deep link: {}", e),
            }

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
