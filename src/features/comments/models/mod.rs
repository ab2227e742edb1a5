mod comment;

pub use comment::CommentWithAuthor;
