use crate::config::AppConfig;
use crate::services::scheduler::MeetingScheduler;

pub struct AppState {
    pub config: AppConfig,
    pub scheduler: MeetingScheduler,
}
