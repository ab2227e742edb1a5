mod post_dto;

pub use post_dto::{CreatePostDto, PostResponseDto, UpdatePostDto};
