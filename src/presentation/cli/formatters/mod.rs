pub mod notification_fmt;
pub mod table_fmt;
