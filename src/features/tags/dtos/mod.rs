mod tag_dto;

pub use tag_dto::{TagNameDto, TagResponseDto, TagWithCountDto};
