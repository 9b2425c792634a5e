mod user_file;

pub use user_file::UserFile;
