mod cover_dto;

pub use cover_dto::{
    CoverAuthorDto, CoverDetailDto, CoverListQuery, CoverResponseDto, GenerateCoverDto,
    UpdateCoverStatusDto,
};
