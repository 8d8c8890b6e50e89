mod translation;

pub use translation::{
    JobStatus, StatusResponse, TranslateRequest, TranslateResponse, TranslationRecord,
    UploadResponse,
};
