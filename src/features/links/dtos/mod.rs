mod link_dto;

pub use link_dto::{
    ActiveLinkDto, GenerateSignedUrlDto, GeneratedLinkDto, PurgeLinksResponseDto,
    RevokeLinkResponseDto,
};
