mod post;

pub use post::PostWithAuthor;
