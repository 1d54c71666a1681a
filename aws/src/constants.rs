use log::LevelFilter;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_LEVEL_FILTER: LevelFilter = LevelFilter::Info;
pub const DEFAULT_ASSUME_ROLE_SESSION_DURATION: i32 = 3600;
pub const SESSION_NAME: &str = "clusternet";
pub const MAX_ATTEMPTS: u32 = 15;
