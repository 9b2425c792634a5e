mod file_dto;

pub use file_dto::{
    is_mime_type_allowed, DeleteFileResponseDto, FileResponseDto, UploadFileDto,
    ALLOWED_MIME_TYPES, MAX_FILE_SIZE,
};
