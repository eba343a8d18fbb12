pub mod error;
pub mod notify;
pub mod permissions;
pub mod session;
pub mod types;

pub use error::{ApiError, ErrorBody, is_auth_failure};
pub use notify::{CollectingNotifier, NoticeLevel, Notifier, NullNotifier, TracingNotifier};
pub use permissions::{check_permission, session_can};
pub use session::{Session, SessionUser, TenancyRole};
pub use types::{new_id, now_rfc3339};
