mod health;
mod post;
mod upload;
mod user;

pub use health::health_check;
pub use post::{
    create_post, delete_post, get_post, list_popular, list_posts, list_posts_by_tag, list_tags,
    update_post,
};
pub use upload::upload_image;
pub use user::{get_me, login, register};
