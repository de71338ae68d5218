pub mod appprobes;
pub mod execute;
pub mod fsprobes;
pub mod observe;
pub mod recording;
pub mod setup;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/probe", get(probe))
        .route("/execute", post(execute::execute))
        .route("/execute_windows", post(execute::execute_windows))
        .route("/screenshot", get(observe::screenshot))
        .route("/accessibility", get(observe::accessibility))
        .route("/obs_winagent", get(observe::obs_winagent))
        .route("/terminal", get(observe::terminal))
        .route("/update_computer", post(observe::update_computer))
        .route("/file", post(fsprobes::file))
        .route("/file_exists", post(fsprobes::file_exists))
        .route("/folder_exists", post(fsprobes::folder_exists))
        .route("/list_directory", post(fsprobes::list_directory))
        .route("/desktop_path", post(observe::desktop_path))
        .route("/documents_path", post(observe::documents_path))
        .route("/wallpaper", post(observe::wallpaper))
        .route("/screen_size", post(observe::screen_size))
        .route("/window_size", post(observe::window_size))
        .route("/is_details_view", post(fsprobes::is_details_view))
        .route("/are_files_sorted_by_modified_time", post(fsprobes::are_files_sorted_by_modified_time))
        .route("/is_directory_read_only_for_user", post(fsprobes::is_directory_read_only_for_user))
        .route("/are_all_images_tagged", post(fsprobes::are_all_images_tagged))
        .route("/library_folders", post(fsprobes::library_folders))
        .route("/check_if_timer_started", post(appprobes::check_if_timer_started))
        .route("/check_if_world_clock_exists", post(appprobes::check_if_world_clock_exists))
        .route("/registry", post(appprobes::registry))
        .route("/start_recording", post(recording::start_recording))
        .route("/end_recording", post(recording::end_recording))
        .route("/setup/{primitive}", post(setup::dispatch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn probe() -> &'static str {
    "ok"
}
