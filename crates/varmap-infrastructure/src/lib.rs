pub mod config_service;
pub mod dto;
pub mod http_point_remote;
pub mod paths;
pub mod point_repository;
pub mod session_state_store;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::http_point_remote::HttpPointRemote;
pub use crate::point_repository::LocalPointRepository;
pub use crate::session_state_store::FileSessionStateStore;
