mod requests;
mod responses;

pub use requests::{LoginRequest, PostRequest, RegisterRequest, ValidatedJson, split_tags};
pub use responses::{
    AuthResponse, AuthorRef, PostResponse, SuccessResponse, UploadResponse, UserResponse,
};
