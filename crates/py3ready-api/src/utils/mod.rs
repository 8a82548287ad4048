pub mod report_id;
pub mod upload;
