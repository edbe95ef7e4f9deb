pub mod time;
pub mod ids;

pub use self::ids::new_connection_id;
pub use self::time::{format_timestamp, now_timestamp};
