pub mod bucket;
pub mod transfer;
pub mod urls;

pub use bucket::{clear_bucket, delete_file, list_buckets, list_files, list_folders};
pub use transfer::{download_file, get_object, put_object, upload_file};
pub use urls::{EndpointParts, presigned_url, public_url};
